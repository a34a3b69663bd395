//! Fixed-point conversion of rewards
//!
//! Rewards are composed in `f64` and converted exactly once, at output time,
//! into an integer count of the token's smallest unit (`reward × 10^18`).
//!
//! The conversion is exact: the float is decomposed into
//! `mantissa × 2^exponent`, multiplied by `10^18` as a big integer and then
//! truncated toward zero. No intermediate float rounding takes place, so
//! large totals neither lose nor gain sub-unit value.

use num_bigint::BigUint;
use num_traits::Zero;
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_economics::DECIMALS;

const MANTISSA_BITS: u32 = 52;
const EXPONENT_MASK: u64 = 0x7ff;
const EXPONENT_BIAS: i64 = 1023;

/// Convert a non-negative reward into smallest units, truncating
pub fn to_fixed_point(reward: f64) -> Result<BigUint> {
    if !reward.is_finite() || reward < 0.0 {
        return Err(RewardsError::NonRepresentableReward(reward));
    }
    if reward == 0.0 {
        return Ok(BigUint::zero());
    }

    let (mantissa, exponent) = decompose(reward);
    let scaled = BigUint::from(mantissa) * BigUint::from(10u32).pow(DECIMALS);
    Ok(if exponent >= 0 {
        scaled << exponent as usize
    } else {
        scaled >> (-exponent) as usize
    })
}

/// Split a positive finite float into `(mantissa, exponent)` with
/// `value == mantissa × 2^exponent` exactly.
fn decompose(value: f64) -> (u64, i64) {
    let bits = value.to_bits();
    let biased = ((bits >> MANTISSA_BITS) & EXPONENT_MASK) as i64;
    let fraction = bits & ((1u64 << MANTISSA_BITS) - 1);

    if biased == 0 {
        // Subnormal
        (fraction, 1 - EXPONENT_BIAS - MANTISSA_BITS as i64)
    } else {
        (
            fraction | (1u64 << MANTISSA_BITS),
            biased - EXPONENT_BIAS - MANTISSA_BITS as i64,
        )
    }
}
