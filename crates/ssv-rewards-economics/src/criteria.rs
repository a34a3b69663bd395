//! Activity criteria
//!
//! Thresholds the activity source applies when deciding whether a validator
//! was active on a given day. The plan only carries them.

use serde::{Deserialize, Serialize};

/// Minimum daily activity for a day to count as active
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// Minimum attestations per day
    #[serde(default = "default_min_attestations_per_day")]
    pub min_attestations_per_day: u32,

    /// Minimum decided duties per day
    #[serde(default)]
    pub min_decideds_per_day: u32,
}

fn default_min_attestations_per_day() -> u32 {
    202
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            min_attestations_per_day: default_min_attestations_per_day(),
            min_decideds_per_day: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_thresholds() {
        let criteria: Criteria = serde_yaml::from_str("min_decideds_per_day: 22").unwrap();
        assert_eq!(criteria.min_attestations_per_day, 202);
        assert_eq!(criteria.min_decideds_per_day, 22);
        assert_eq!(Criteria::default().min_decideds_per_day, 0);
    }
}
