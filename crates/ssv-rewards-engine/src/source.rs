//! Activity sources
//!
//! The engine does not know how activity is derived. It asks an
//! `ActivitySource` for per-validator and per-owner active-day counts of a
//! period, and for the time range covered by performance data.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;
use ssv_rewards_core::types::{OwnerParticipation, ValidatorParticipation};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Provider of raw validator performance data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceProvider {
    /// beaconcha.in
    #[default]
    Beaconcha,
    /// Ethereum 2.0 monitor
    E2m,
}

impl PerformanceProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beaconcha => "beaconcha",
            Self::E2m => "e2m",
        }
    }
}

impl fmt::Display for PerformanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PerformanceProvider {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "beaconcha" => Ok(Self::Beaconcha),
            "e2m" => Ok(Self::E2m),
            other => Err(RewardsError::Source(format!(
                "unknown performance provider: {other}"
            ))),
        }
    }
}

/// Parameters of an activity query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Period to count active days in
    pub period: Period,

    /// Performance data provider
    pub provider: PerformanceProvider,

    /// Minimum attestations for a day to count as active
    pub min_attestations_per_day: u32,

    /// Minimum decided duties for a day to count as active
    pub min_decideds_per_day: u32,
}

/// Time range covered by performance data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceBounds {
    /// Earliest data point, if any data exists
    pub earliest: Option<DateTime<Utc>>,

    /// Latest data point, if any data exists
    pub latest: Option<DateTime<Utc>>,
}

impl PerformanceBounds {
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Self {
        Self {
            earliest: Some(earliest),
            latest: Some(latest),
        }
    }
}

/// External source of per-period activity
pub trait ActivitySource {
    /// Range of available performance data
    fn performance_bounds(&self) -> Result<PerformanceBounds>;

    /// Active days of every validator in the period
    fn validator_activity(&self, query: &ActivityQuery) -> Result<Vec<ValidatorParticipation>>;

    /// Active days of every owner in the period
    fn owner_activity(&self, query: &ActivityQuery) -> Result<Vec<OwnerParticipation>>;
}

impl<S: ActivitySource + ?Sized> ActivitySource for &S {
    fn performance_bounds(&self) -> Result<PerformanceBounds> {
        (**self).performance_bounds()
    }

    fn validator_activity(&self, query: &ActivityQuery) -> Result<Vec<ValidatorParticipation>> {
        (**self).validator_activity(query)
    }

    fn owner_activity(&self, query: &ActivityQuery) -> Result<Vec<OwnerParticipation>> {
        (**self).owner_activity(query)
    }
}

/// In-memory activity source
///
/// Records are stored already filtered by the activity criteria, so the
/// thresholds of a query are not applied again.
#[derive(Default)]
pub struct MemorySource {
    bounds: RwLock<PerformanceBounds>,
    validators: RwLock<HashMap<(PerformanceProvider, Period), Vec<ValidatorParticipation>>>,
    owners: RwLock<HashMap<(PerformanceProvider, Period), Vec<OwnerParticipation>>>,
}

impl MemorySource {
    pub fn new(bounds: PerformanceBounds) -> Self {
        Self {
            bounds: RwLock::new(bounds),
            ..Default::default()
        }
    }

    pub fn set_bounds(&self, bounds: PerformanceBounds) {
        *self.bounds.write() = bounds;
    }

    pub fn put_validators(
        &self,
        provider: PerformanceProvider,
        period: Period,
        records: Vec<ValidatorParticipation>,
    ) {
        self.validators.write().insert((provider, period), records);
    }

    pub fn put_owners(
        &self,
        provider: PerformanceProvider,
        period: Period,
        records: Vec<OwnerParticipation>,
    ) {
        self.owners.write().insert((provider, period), records);
    }
}

impl ActivitySource for MemorySource {
    fn performance_bounds(&self) -> Result<PerformanceBounds> {
        Ok(*self.bounds.read())
    }

    fn validator_activity(&self, query: &ActivityQuery) -> Result<Vec<ValidatorParticipation>> {
        Ok(self
            .validators
            .read()
            .get(&(query.provider, query.period))
            .cloned()
            .unwrap_or_default())
    }

    fn owner_activity(&self, query: &ActivityQuery) -> Result<Vec<OwnerParticipation>> {
        Ok(self
            .owners
            .read()
            .get(&(query.provider, query.period))
            .cloned()
            .unwrap_or_default())
    }
}
