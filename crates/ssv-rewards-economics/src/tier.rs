//! # Participation Tiers
//!
//! Tiers map the size of the active cohort to an APR boost. A cohort of `n`
//! validators earns the boost of the smallest tier whose `max_participants`
//! is at least `n`.
//!
//! | Cohort size | Resolved tier |
//! |-------------|---------------|
//! | 1 ..= t₁ | tier 1 |
//! | t₁+1 ..= t₂ | tier 2 |
//! | > t_last | error: the plan must be extended |

use serde::{Deserialize, Serialize};
use ssv_rewards_core::error::{Result, RewardsError};
use std::ops::Deref;

/// A cohort-size bracket and the APR multiplier it earns
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Largest cohort this tier accommodates
    pub max_participants: u64,

    /// Multiplier applied to the base APR
    pub apr_boost: f64,
}

impl Tier {
    pub fn new(max_participants: u64, apr_boost: f64) -> Self {
        Self {
            max_participants,
            apr_boost,
        }
    }

    /// Whether a cohort of `participants` fits in this tier
    pub fn accommodates(&self, participants: u64) -> bool {
        participants <= self.max_participants
    }
}

/// Tiers in ascending order of `max_participants`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tiers(Vec<Tier>);

impl Tiers {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self(tiers)
    }

    /// Ordering predicate: no tier is smaller than the one before it
    pub fn is_sorted(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[0].max_participants <= pair[1].max_participants)
    }

    /// Highest configured bound
    pub fn highest(&self) -> Option<&Tier> {
        self.0.last()
    }

    /// Check the tier invariants, failing on the first violation
    pub fn validate(&self) -> Result<()> {
        let first = self.0.first().ok_or(RewardsError::MissingTiers)?;
        if !self.is_sorted() {
            return Err(RewardsError::TiersNotSorted);
        }
        if first.max_participants == 0 {
            return Err(RewardsError::NonPositiveTierBound);
        }
        if let Some(pair) = self
            .0
            .windows(2)
            .find(|pair| pair[0].max_participants == pair[1].max_participants)
        {
            return Err(RewardsError::DuplicateTier(pair[1].max_participants));
        }
        if let Some(tier) = self
            .0
            .iter()
            .find(|tier| !(tier.apr_boost.is_finite() && tier.apr_boost > 0.0))
        {
            return Err(RewardsError::InvalidAprBoost {
                max_participants: tier.max_participants,
                apr_boost: tier.apr_boost,
            });
        }
        Ok(())
    }

    /// Resolve the smallest tier that accommodates `participants`
    pub fn resolve(&self, participants: i64) -> Result<&Tier> {
        if participants <= 0 {
            return Err(RewardsError::NonPositiveParticipants(participants));
        }
        if !self.is_sorted() {
            return Err(RewardsError::TiersNotSorted);
        }
        let participants = participants as u64;
        self.0
            .iter()
            .find(|tier| tier.accommodates(participants))
            .ok_or_else(|| RewardsError::ParticipantsExceedHighestTier {
                participants,
                highest: self.highest().map(|t| t.max_participants).unwrap_or(0),
            })
    }
}

impl Deref for Tiers {
    type Target = [Tier];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Tier>> for Tiers {
    fn from(tiers: Vec<Tier>) -> Self {
        Self(tiers)
    }
}
