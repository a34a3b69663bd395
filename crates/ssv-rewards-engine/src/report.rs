//! Reports handed to a sink after every round and at the end of a run

use num_bigint::BigUint;
use ssv_rewards_core::error::Result;
use ssv_rewards_core::period::Period;
use ssv_rewards_core::types::{OwnerParticipation, RoundParticipation, ValidatorParticipation};
use ssv_rewards_economics::{RewardRates, Round};
use std::collections::BTreeMap;

/// Result of one processed round
#[derive(Clone, Debug, PartialEq)]
pub struct RoundReport {
    /// Round inputs
    pub round: Round,

    /// Resolved tier and rates
    pub rates: RewardRates,

    /// Rewarded validator records of the round
    pub validators: Vec<ValidatorParticipation>,

    /// Rewarded owner records of the round
    pub owners: Vec<OwnerParticipation>,

    /// Owner totals after this round, in smallest units
    pub cumulative: BTreeMap<String, BigUint>,
}

impl RoundReport {
    pub fn period(&self) -> Period {
        self.round.period
    }

    /// Cohort size the tier was resolved for
    pub fn participants(&self) -> usize {
        self.validators.len()
    }
}

/// Result of a complete run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinalReport {
    /// Periods processed, in order
    pub periods: Vec<Period>,

    /// Every validator record of every round
    pub by_validator: Vec<RoundParticipation<ValidatorParticipation>>,

    /// Every owner record of every round
    pub by_owner: Vec<RoundParticipation<OwnerParticipation>>,

    /// Lifetime totals per validator
    pub total_by_validator: Vec<ValidatorParticipation>,

    /// Lifetime totals per owner
    pub total_by_owner: Vec<OwnerParticipation>,

    /// Lifetime validator rewards in smallest units
    pub cumulative_by_validator: BTreeMap<String, BigUint>,

    /// Lifetime owner rewards in smallest units
    pub cumulative_by_owner: BTreeMap<String, BigUint>,
}

/// Destination of reports
pub trait ReportSink {
    /// Called once a round has passed every check
    fn round_completed(&mut self, report: &RoundReport) -> Result<()>;

    /// Called once after the last round
    fn finished(&mut self, report: &FinalReport) -> Result<()>;
}

/// Sink that keeps every report in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rounds: Vec<RoundReport>,
    pub report: Option<FinalReport>,
}

impl ReportSink for MemorySink {
    fn round_completed(&mut self, report: &RoundReport) -> Result<()> {
        self.rounds.push(report.clone());
        Ok(())
    }

    fn finished(&mut self, report: &FinalReport) -> Result<()> {
        self.report = Some(report.clone());
        Ok(())
    }
}
