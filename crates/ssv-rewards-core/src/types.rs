//! Participation records
//!
//! Records arrive from the activity source with `reward` set to zero; the
//! engine fills the reward in and folds copies into the cumulative ledger.

use crate::period::Period;
use serde::{Deserialize, Serialize};

/// Owner (operator account) address, as reported by the activity source
pub type OwnerAddress = String;

/// Validator public key, as reported by the activity source
pub type PublicKey = String;

/// A record that can be rewarded per active day and accumulated across rounds
pub trait Participation: Clone {
    /// Ledger key identifying the entity
    fn identity(&self) -> &str;

    /// Active days counted for the entity
    fn active_days(&self) -> u64;

    /// Reward attached to the record
    fn reward(&self) -> f64;

    /// Attach a reward to the record
    fn set_reward(&mut self, reward: f64);

    /// Fold a later record for the same entity into this one
    fn accumulate(&mut self, later: &Self);
}

/// Validator activity for one period
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorParticipation {
    /// Owner controlling the validator
    pub owner_address: OwnerAddress,

    /// Validator public key
    pub public_key: PublicKey,

    /// Days the validator met the activity criteria
    pub active_days: u64,

    /// Reward for the period (or running total in the ledger)
    #[serde(default)]
    pub reward: f64,
}

impl ValidatorParticipation {
    pub fn new(
        owner_address: impl Into<OwnerAddress>,
        public_key: impl Into<PublicKey>,
        active_days: u64,
    ) -> Self {
        Self {
            owner_address: owner_address.into(),
            public_key: public_key.into(),
            active_days,
            reward: 0.0,
        }
    }
}

impl Participation for ValidatorParticipation {
    fn identity(&self) -> &str {
        &self.public_key
    }

    fn active_days(&self) -> u64 {
        self.active_days
    }

    fn reward(&self) -> f64 {
        self.reward
    }

    fn set_reward(&mut self, reward: f64) {
        self.reward = reward;
    }

    fn accumulate(&mut self, later: &Self) {
        self.active_days += later.active_days;
        self.reward += later.reward;
    }
}

/// Owner activity for one period, aggregated over the owner's validators
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerParticipation {
    /// Owner address
    pub owner_address: OwnerAddress,

    /// Number of validators the owner runs in the period
    pub validators: u64,

    /// Sum of the owner's validators' active days
    pub active_days: u64,

    /// Reward for the period (or running total in the ledger)
    #[serde(default)]
    pub reward: f64,
}

impl OwnerParticipation {
    pub fn new(owner_address: impl Into<OwnerAddress>, validators: u64, active_days: u64) -> Self {
        Self {
            owner_address: owner_address.into(),
            validators,
            active_days,
            reward: 0.0,
        }
    }
}

impl Participation for OwnerParticipation {
    fn identity(&self) -> &str {
        &self.owner_address
    }

    fn active_days(&self) -> u64 {
        self.active_days
    }

    fn reward(&self) -> f64 {
        self.reward
    }

    fn set_reward(&mut self, reward: f64) {
        self.reward = reward;
    }

    /// Days and rewards add up; the validator count stays at the owner's
    /// first round.
    fn accumulate(&mut self, later: &Self) {
        self.active_days += later.active_days;
        self.reward += later.reward;
    }
}

/// A participation record tagged with the round it was earned in
#[derive(Clone, Debug, PartialEq)]
pub struct RoundParticipation<T> {
    pub period: Period,
    pub participation: T,
}

impl<T> RoundParticipation<T> {
    pub fn new(period: Period, participation: T) -> Self {
        Self {
            period,
            participation,
        }
    }
}
