//! # SSV Rewards Core
//!
//! Shared vocabulary for the SSV incentive program reward calculation.
//!
//! This crate provides the building blocks used by the plan and the engine:
//! - `Period` - A calendar month, the unit a reward round is measured in
//! - `ValidatorParticipation` / `OwnerParticipation` - Per-entity activity records
//! - `RewardsError` - The error taxonomy shared by every stage of a run
//!
//! ## Reward Flow
//!
//! ```text
//!   rewards.yaml ──► Plan ──┬──► tier(participants) ──► rates(period)
//!                           │                               │
//!   activity source ────────┴──► records ──► reward = daily × active_days
//!                                                           │
//!                                  ledger (create-or-increment) ◄┘
//!                                                           │
//!                                       fixed point (× 10^18) ◄┘
//! ```

pub mod error;
pub mod period;
pub mod types;

pub use error::*;
pub use period::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ErrorKind, Result, RewardsError};
    pub use crate::period::Period;
    pub use crate::types::*;
}
