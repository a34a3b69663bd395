//! # SSV Rewards Engine
//!
//! Turns a validated [`Plan`](ssv_rewards_economics::Plan) and per-period
//! activity into per-round and cumulative rewards.
//!
//! - `eligibility` - Which rounds can be paid given the available data
//! - `engine` - The sequential round-by-round aggregation run
//! - `ledger` - Keyed running totals with create-or-increment merges
//! - `fixed_point` - Exact float to smallest-unit integer conversion
//! - `source` - The activity source boundary and an in-memory source
//! - `report` - What a run hands to its report sink

pub mod eligibility;
pub mod engine;
pub mod fixed_point;
pub mod ledger;
pub mod report;
pub mod source;

pub use eligibility::{check_data_availability, select_eligible_rounds};
pub use engine::{AggregationEngine, EngineSettings, RunState};
pub use fixed_point::to_fixed_point;
pub use ledger::Ledger;
pub use report::{FinalReport, MemorySink, ReportSink, RoundReport};
pub use source::{
    ActivityQuery, ActivitySource, MemorySource, PerformanceBounds, PerformanceProvider,
};
