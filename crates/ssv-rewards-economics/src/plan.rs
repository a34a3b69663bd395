//! # Reward Plan
//!
//! The plan is loaded once from `rewards.yaml`, validated as a whole and then
//! only read. A plan value that exists has passed every check below.
//!
//! ```yaml
//! criteria:
//!   min_attestations_per_day: 202
//!   min_decideds_per_day: 22
//! tiers:
//!   - max_participants: 2000
//!     apr_boost: 0.5
//!   - max_participants: 5000
//!     apr_boost: 0.4
//! rounds:
//!   - period: 2023-06
//!     eth_apr: 0.047
//!     ssv_eth: 0.0088
//! ```

use crate::constants::{MONTHS_PER_YEAR, VALIDATOR_ETH_BALANCE};
use crate::criteria::Criteria;
use crate::round::{Round, Rounds};
use crate::tier::{Tier, Tiers};
use serde::{Deserialize, Serialize};
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;

/// Per-validator reward rates for one period, in SSV
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RewardRates {
    /// Tier the cohort resolved to
    pub tier: Tier,

    /// Reward per active day
    pub daily: f64,

    /// Reward per month
    pub monthly: f64,

    /// Reward per year
    pub annual: f64,
}

/// Raw plan document before validation
#[derive(Deserialize)]
struct PlanDocument {
    #[serde(default)]
    criteria: Criteria,
    #[serde(default)]
    tiers: Tiers,
    #[serde(default)]
    rounds: Rounds,
}

/// Validated reward plan
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plan {
    criteria: Criteria,
    tiers: Tiers,
    rounds: Rounds,
}

impl Plan {
    /// Build and validate a plan
    pub fn new(criteria: Criteria, tiers: Tiers, rounds: Rounds) -> Result<Self> {
        let plan = Self {
            criteria,
            tiers,
            rounds,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Parse and validate a YAML plan document
    pub fn from_yaml(document: &str) -> Result<Self> {
        let raw: PlanDocument = serde_yaml::from_str(document)
            .map_err(|e| RewardsError::PlanParse(e.to_string()))?;
        let plan = Self::new(raw.criteria, raw.tiers, raw.rounds)?;
        tracing::debug!(
            tiers = plan.tiers.len(),
            rounds = plan.rounds.len(),
            "Parsed rewards plan"
        );
        Ok(plan)
    }

    /// Check every plan invariant: tiers first, then rounds
    pub fn validate(&self) -> Result<()> {
        self.tiers.validate()?;
        self.rounds.validate()
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn tiers(&self) -> &Tiers {
        &self.tiers
    }

    pub fn rounds(&self) -> &Rounds {
        &self.rounds
    }

    /// Earliest configured round
    pub fn first_round(&self) -> &Round {
        // Validation guarantees at least one round.
        &self.rounds[0]
    }

    /// Tier for a cohort of `participants` validators
    pub fn tier(&self, participants: i64) -> Result<&Tier> {
        self.tiers.resolve(participants)
    }

    /// Per-validator reward rates for `period` given the cohort size
    pub fn reward_rates(&self, period: Period, participants: i64) -> Result<RewardRates> {
        let tier = *self.tier(participants)?;
        let round = self
            .rounds
            .find(period)
            .ok_or(RewardsError::PeriodNotFound(period))?;

        let annual = (VALIDATOR_ETH_BALANCE * round.eth_apr) / round.ssv_eth * tier.apr_boost;
        let monthly = annual / MONTHS_PER_YEAR;
        let daily = monthly / period.days() as f64;

        Ok(RewardRates {
            tier,
            daily,
            monthly,
            annual,
        })
    }
}
