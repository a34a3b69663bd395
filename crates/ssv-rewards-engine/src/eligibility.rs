//! Round eligibility
//!
//! A round can only be paid once its month has been fully observed: the
//! latest performance data point must lie in a later month. Rounds with
//! unknown rate inputs are skipped as well.

use crate::source::PerformanceBounds;
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;
use ssv_rewards_economics::{Plan, Round};

/// Verify that performance data covers the plan, returning the period of
/// the latest data point
pub fn check_data_availability(plan: &Plan, bounds: &PerformanceBounds) -> Result<Period> {
    let (earliest, latest) = match (bounds.earliest, bounds.latest) {
        (Some(earliest), Some(latest)) => (earliest, latest),
        _ => return Err(RewardsError::PerformanceDataUnavailable),
    };
    if earliest > latest {
        return Err(RewardsError::InvalidPerformanceBounds { earliest, latest });
    }

    let first = plan.first_round().period;
    if earliest > first.start() {
        return Err(RewardsError::FirstRoundNotCovered {
            period: first,
            earliest,
        });
    }
    Ok(Period::containing(latest))
}

/// Complete rounds whose period ends before the period of the latest data
/// point, in chronological order
pub fn select_eligible_rounds(plan: &Plan, latest: Period) -> Vec<Round> {
    plan.rounds()
        .complete()
        .filter(|round| round.period < latest)
        .copied()
        .collect()
}
