//! Error types for SSV rewards operations

use crate::period::Period;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for reward operations
pub type Result<T> = std::result::Result<T, RewardsError>;

/// Errors that can occur while loading a plan or running a calculation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewardsError {
    // === Plan Configuration ===
    /// The plan document could not be parsed
    #[error("failed to parse rewards plan: {0}")]
    PlanParse(String),

    /// Plan has no tiers
    #[error("missing tiers")]
    MissingTiers,

    /// Tiers are not strictly ascending
    #[error("tiers are not sorted by max participants")]
    TiersNotSorted,

    /// Lowest tier accepts no participants
    #[error("max participants must be positive")]
    NonPositiveTierBound,

    /// Two adjacent tiers share a bound
    #[error("duplicate tier: {0}")]
    DuplicateTier(u64),

    /// Tier multiplier is zero, negative or not finite
    #[error("invalid apr boost {apr_boost} for tier {max_participants}")]
    InvalidAprBoost { max_participants: u64, apr_boost: f64 },

    /// Plan has no rounds
    #[error("missing rounds")]
    MissingRounds,

    /// Rounds are not strictly ascending
    #[error("rounds are not sorted by period")]
    RoundsNotSorted,

    /// Two adjacent rounds share a period
    #[error("duplicate round: {0}")]
    DuplicateRound(Period),

    /// Period string or calendar month is malformed
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Round rate inputs are negative or not finite
    #[error("invalid rates for round {period}: eth apr {eth_apr}, ssv/eth {ssv_eth}")]
    InvalidRoundRates {
        period: Period,
        eth_apr: f64,
        ssv_eth: f64,
    },

    // === Tier & Round Resolution ===
    /// Participant count is zero or negative
    #[error("participants must be positive, got {0}")]
    NonPositiveParticipants(i64),

    /// No tier is large enough for the cohort
    #[error("participants exceed highest tier: {participants} > {highest}")]
    ParticipantsExceedHighestTier { participants: u64, highest: u64 },

    /// No round is configured for the period
    #[error("period not found: {0}")]
    PeriodNotFound(Period),

    // === Source Data Consistency ===
    /// Owner's reported active days differ from the sum over its validators
    #[error("inconsistent active days for owner {owner:?} in {period}: reported {reported}, validators sum to {summed}")]
    InconsistentActiveDays {
        period: Period,
        owner: String,
        reported: u64,
        summed: u64,
    },

    /// Validators report activity for an owner the source did not return
    #[error("owner {owner:?} has {summed} validator active days in {period} but no owner record")]
    MissingOwnerRecord {
        period: Period,
        owner: String,
        summed: u64,
    },

    // === Data Availability ===
    /// No performance data has been collected
    #[error("validator performance data is not available")]
    PerformanceDataUnavailable,

    /// Performance bounds are inverted
    #[error("invalid state: earliest validator performance ({earliest}) is after latest validator performance ({latest})")]
    InvalidPerformanceBounds {
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    /// Performance data starts after the first configured round
    #[error("validator performance data is not available for the first round {period} (earliest: {earliest})")]
    FirstRoundNotCovered {
        period: Period,
        earliest: DateTime<Utc>,
    },

    // === Monetary Conversion ===
    /// Reward cannot be represented as a non-negative fixed-point integer
    #[error("cannot convert reward {0} to fixed point")]
    NonRepresentableReward(f64),

    // === Adapters ===
    /// External activity source failed
    #[error("activity source error: {0}")]
    Source(String),

    /// Report sink failed
    #[error("export error: {0}")]
    Export(String),
}

/// Coarse error classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or semantically invalid plan
    Configuration,
    /// Plan does not cover observed data
    Resolution,
    /// Upstream activity data contradicts itself
    Consistency,
    /// Performance data does not cover the requested rounds
    DataAvailability,
    /// Floating-point reward cannot be made exact
    Conversion,
    /// Activity source I/O
    Source,
    /// Report sink I/O
    Export,
}

impl RewardsError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlanParse(_)
            | Self::MissingTiers
            | Self::TiersNotSorted
            | Self::NonPositiveTierBound
            | Self::DuplicateTier(_)
            | Self::InvalidAprBoost { .. }
            | Self::MissingRounds
            | Self::RoundsNotSorted
            | Self::DuplicateRound(_)
            | Self::InvalidPeriod(_)
            | Self::InvalidRoundRates { .. } => ErrorKind::Configuration,
            Self::NonPositiveParticipants(_)
            | Self::ParticipantsExceedHighestTier { .. }
            | Self::PeriodNotFound(_) => ErrorKind::Resolution,
            Self::InconsistentActiveDays { .. } | Self::MissingOwnerRecord { .. } => {
                ErrorKind::Consistency
            }
            Self::PerformanceDataUnavailable
            | Self::InvalidPerformanceBounds { .. }
            | Self::FirstRoundNotCovered { .. } => ErrorKind::DataAvailability,
            Self::NonRepresentableReward(_) => ErrorKind::Conversion,
            Self::Source(_) => ErrorKind::Source,
            Self::Export(_) => ErrorKind::Export,
        }
    }

    /// Check if error is recoverable
    ///
    /// Nothing in a run is retried automatically: every error requires the
    /// operator to fix the plan or the upstream data and start again.
    pub fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RewardsError::TiersNotSorted.kind(), ErrorKind::Configuration);
        assert_eq!(
            RewardsError::ParticipantsExceedHighestTier {
                participants: 1500,
                highest: 1000
            }
            .kind(),
            ErrorKind::Resolution
        );
        assert_eq!(
            RewardsError::PerformanceDataUnavailable.kind(),
            ErrorKind::DataAvailability
        );
    }

    #[test]
    fn test_error_display() {
        let err = RewardsError::ParticipantsExceedHighestTier {
            participants: 1500,
            highest: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("participants exceed highest tier"));
        assert!(msg.contains("1500"));

        let period: Period = "2023-06".parse().unwrap();
        let err = RewardsError::InconsistentActiveDays {
            period,
            owner: "0xabc".into(),
            reported: 31,
            summed: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xabc"));
        assert!(msg.contains("2023-06"));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn test_nothing_is_recoverable() {
        assert!(!RewardsError::MissingRounds.is_recoverable());
        assert!(!RewardsError::Source("timeout".into()).is_recoverable());
    }
}
