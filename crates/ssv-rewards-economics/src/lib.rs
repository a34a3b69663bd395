//! # SSV Rewards Economics - Incentive Plan & Reward Rates
//!
//! The reward plan for the SSV incentive program: which cohort sizes earn
//! which boost, what the base APR was in every month, and how those two turn
//! into a per-validator daily reward denominated in SSV.
//!
//! ## Reward Formula
//!
//! ```text
//! annual  = VALIDATOR_ETH_BALANCE × eth_apr / ssv_eth × apr_boost
//! monthly = annual / 12
//! daily   = monthly / days_in_period
//! ```
//!
//! ## Example Plan
//!
//! | Tier | Max Participants | APR Boost |
//! |------|------------------|-----------|
//! | 1 | 2,000 | 0.50 |
//! | 2 | 5,000 | 0.40 |
//! | 3 | 10,000 | 0.30 |
//!
//! A month with 3,100 active validators falls into tier 2 and earns
//! `32 × eth_apr / ssv_eth × 0.40` SSV per validator-year.

pub mod criteria;
pub mod plan;
pub mod round;
pub mod tier;

// Re-exports
pub use criteria::Criteria;
pub use plan::{Plan, RewardRates};
pub use round::{Round, Rounds};
pub use tier::{Tier, Tiers};

/// Reward plan constants
pub mod constants {
    /// ETH balance of an Ethereum validator; the staking unit rewards are computed on
    pub const VALIDATOR_ETH_BALANCE: f64 = 32.0;

    /// Months per year
    pub const MONTHS_PER_YEAR: f64 = 12.0;

    /// Decimal places of the SSV token
    pub const DECIMALS: u32 = 18;

    /// One SSV in its smallest unit
    pub const ONE_SSV: u128 = 1_000_000_000_000_000_000; // 10^18
}

pub use constants::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_ssv_matches_decimals() {
        assert_eq!(ONE_SSV, 10u128.pow(DECIMALS));
    }
}
