//! File-backed activity source
//!
//! ## Snapshot Layout
//!
//! ```text
//! <data_dir>/
//! ├── state.json                 performance bounds + thresholds used
//! └── <provider>/
//!     └── <YYYY-MM>/
//!         ├── validators.csv     owner_address,public_key,active_days
//!         └── owners.csv         owner_address,validators,active_days
//! ```
//!
//! Active days in a snapshot were already counted with the thresholds in
//! `state.json`; a query with other thresholds is refused rather than
//! silently answered with the wrong counts.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::types::{OwnerParticipation, ValidatorParticipation};
use ssv_rewards_engine::{ActivityQuery, ActivitySource, PerformanceBounds};
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.json";
const VALIDATORS_FILE: &str = "validators.csv";
const OWNERS_FILE: &str = "owners.csv";

/// Contents of `state.json`
#[derive(Clone, Debug, Deserialize)]
struct SnapshotState {
    #[serde(default)]
    earliest_validator_performance: Option<DateTime<Utc>>,
    #[serde(default)]
    latest_validator_performance: Option<DateTime<Utc>>,
    min_attestations_per_day: u32,
    #[serde(default)]
    min_decideds_per_day: Option<u32>,
}

/// Activity source reading a snapshot directory
pub struct SnapshotSource {
    root: PathBuf,
    state: SnapshotState,
}

impl SnapshotSource {
    /// Open the snapshot rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let path = root.join(STATE_FILE);
        let data = std::fs::read_to_string(&path)
            .map_err(|e| RewardsError::Source(format!("failed to read {}: {e}", path.display())))?;
        let state = serde_json::from_str(&data)
            .map_err(|e| RewardsError::Source(format!("failed to parse {}: {e}", path.display())))?;
        tracing::debug!(root = %root.display(), "Opened activity snapshot");
        Ok(Self { root, state })
    }

    fn period_dir(&self, query: &ActivityQuery) -> Result<PathBuf> {
        if query.min_attestations_per_day != self.state.min_attestations_per_day {
            return Err(RewardsError::Source(format!(
                "snapshot counts active days with {} minimum attestations per day, {} requested",
                self.state.min_attestations_per_day, query.min_attestations_per_day
            )));
        }
        if let Some(decideds) = self.state.min_decideds_per_day {
            if decideds != query.min_decideds_per_day {
                return Err(RewardsError::Source(format!(
                    "snapshot counts active days with {} minimum decideds per day, {} requested",
                    decideds, query.min_decideds_per_day
                )));
            }
        }

        let provider_dir = self.root.join(query.provider.name());
        if !provider_dir.is_dir() {
            return Err(RewardsError::Source(format!(
                "no performance data from provider {} in {}",
                query.provider,
                self.root.display()
            )));
        }
        Ok(provider_dir.join(query.period.to_string()))
    }
}

/// Read every record of a CSV file; a missing file has no records
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| RewardsError::Source(format!("failed to open {}: {e}", path.display())))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| RewardsError::Source(format!("failed to read {}: {e}", path.display())))
}

impl ActivitySource for SnapshotSource {
    fn performance_bounds(&self) -> Result<PerformanceBounds> {
        Ok(PerformanceBounds {
            earliest: self.state.earliest_validator_performance,
            latest: self.state.latest_validator_performance,
        })
    }

    fn validator_activity(&self, query: &ActivityQuery) -> Result<Vec<ValidatorParticipation>> {
        read_records(&self.period_dir(query)?.join(VALIDATORS_FILE))
    }

    fn owner_activity(&self, query: &ActivityQuery) -> Result<Vec<OwnerParticipation>> {
        read_records(&self.period_dir(query)?.join(OWNERS_FILE))
    }
}
