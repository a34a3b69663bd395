//! Reward rounds
//!
//! One round per calendar month, carrying the base ETH APR and the SSV/ETH
//! price for that month. Rounds whose inputs are not yet known are kept in
//! the plan with zero values and skipped by the engine.

use serde::{Deserialize, Serialize};
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;
use std::ops::Deref;

/// Rate inputs for one period
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Month the round covers
    pub period: Period,

    /// Base annual percentage rate of ETH staking
    pub eth_apr: f64,

    /// SSV price denominated in ETH
    pub ssv_eth: f64,
}

impl Round {
    pub fn new(period: Period, eth_apr: f64, ssv_eth: f64) -> Self {
        Self {
            period,
            eth_apr,
            ssv_eth,
        }
    }

    /// Both rate inputs are known
    pub fn is_complete(&self) -> bool {
        self.eth_apr > 0.0 && self.ssv_eth > 0.0
    }
}

/// Rounds in ascending order of period
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rounds(Vec<Round>);

impl Rounds {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self(rounds)
    }

    /// Ordering predicate: no round precedes the one before it
    pub fn is_sorted(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0].period <= pair[1].period)
    }

    /// Check the round invariants, failing on the first violation
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(RewardsError::MissingRounds);
        }
        if !self.is_sorted() {
            return Err(RewardsError::RoundsNotSorted);
        }
        if let Some(pair) = self.0.windows(2).find(|pair| pair[0].period == pair[1].period) {
            return Err(RewardsError::DuplicateRound(pair[1].period));
        }
        if let Some(round) = self.0.iter().find(|round| round.period.days() == 0) {
            return Err(RewardsError::InvalidPeriod(round.period.to_string()));
        }
        let valid_rate = |rate: f64| rate.is_finite() && rate >= 0.0;
        if let Some(round) = self
            .0
            .iter()
            .find(|round| !valid_rate(round.eth_apr) || !valid_rate(round.ssv_eth))
        {
            return Err(RewardsError::InvalidRoundRates {
                period: round.period,
                eth_apr: round.eth_apr,
                ssv_eth: round.ssv_eth,
            });
        }
        Ok(())
    }

    /// Round configured for `period`
    pub fn find(&self, period: Period) -> Option<&Round> {
        self.0.iter().find(|round| round.period == period)
    }

    /// Rounds whose rate inputs are known
    pub fn complete(&self) -> impl Iterator<Item = &Round> {
        self.0.iter().filter(|round| round.is_complete())
    }
}

impl Deref for Rounds {
    type Target = [Round];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Round>> for Rounds {
    fn from(rounds: Vec<Round>) -> Self {
        Self(rounds)
    }
}
