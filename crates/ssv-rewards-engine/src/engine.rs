//! # Aggregation Engine
//!
//! Drives one calculation run over a validated plan.
//!
//! ## Run States
//!
//! ```text
//!   Idle ──► SelectingRounds ──► ProcessingRound[0] ──► … ──► ProcessingRound[n]
//!                  │                     │                            │
//!                  ▼                     ▼                            ▼
//!               Failed ◄──────────── Failed               Finalizing ──► Done
//! ```
//!
//! Rounds are processed one at a time in ascending period order. Every error
//! is fatal: the run moves to `Failed` and has to be started again once the
//! plan or the upstream data has been fixed.

use crate::eligibility::{check_data_availability, select_eligible_rounds};
use crate::ledger::Ledger;
use crate::report::{FinalReport, ReportSink, RoundReport};
use crate::source::{ActivityQuery, ActivitySource, PerformanceProvider};
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;
use ssv_rewards_core::types::{
    OwnerParticipation, Participation, RoundParticipation, ValidatorParticipation,
};
use ssv_rewards_economics::{Plan, RewardRates, Round};
use std::collections::{BTreeMap, HashSet};

/// State of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SelectingRounds,
    ProcessingRound { index: usize, period: Period },
    Finalizing,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Activity query parameters of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Performance data provider
    pub provider: PerformanceProvider,

    /// Minimum attestations for a day to count as active
    pub min_attestations_per_day: u32,

    /// Minimum decided duties for a day to count as active
    pub min_decideds_per_day: u32,
}

impl EngineSettings {
    /// Settings taking the activity thresholds from the plan's criteria
    pub fn from_plan(plan: &Plan, provider: PerformanceProvider) -> Self {
        let criteria = plan.criteria();
        Self {
            provider,
            min_attestations_per_day: criteria.min_attestations_per_day,
            min_decideds_per_day: criteria.min_decideds_per_day,
        }
    }

    fn query(&self, period: Period) -> ActivityQuery {
        ActivityQuery {
            period,
            provider: self.provider,
            min_attestations_per_day: self.min_attestations_per_day,
            min_decideds_per_day: self.min_decideds_per_day,
        }
    }
}

/// Round-by-round reward aggregation
pub struct AggregationEngine<'a, S> {
    plan: &'a Plan,
    source: S,
    settings: EngineSettings,
    state: RunState,
    validator_totals: Ledger<ValidatorParticipation>,
    owner_totals: Ledger<OwnerParticipation>,
    by_validator: Vec<RoundParticipation<ValidatorParticipation>>,
    by_owner: Vec<RoundParticipation<OwnerParticipation>>,
    periods: Vec<Period>,
}

impl<'a, S: ActivitySource> AggregationEngine<'a, S> {
    pub fn new(plan: &'a Plan, source: S, settings: EngineSettings) -> Self {
        Self {
            plan,
            source,
            settings,
            state: RunState::Idle,
            validator_totals: Ledger::new(),
            owner_totals: Ledger::new(),
            by_validator: Vec::new(),
            by_owner: Vec::new(),
            periods: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn validator_totals(&self) -> &Ledger<ValidatorParticipation> {
        &self.validator_totals
    }

    pub fn owner_totals(&self) -> &Ledger<OwnerParticipation> {
        &self.owner_totals
    }

    /// Run the calculation over every eligible round, reporting to `sink`
    pub fn run(mut self, sink: &mut dyn ReportSink) -> Result<FinalReport> {
        let result = self.run_rounds(sink);
        self.settle(result)?;

        self.state = RunState::Finalizing;
        let total_reward = self.owner_totals.total_reward();
        let report = self.finalize();
        let report = self.settle(report)?;
        let finished = sink.finished(&report);
        self.settle(finished)?;

        self.state = RunState::Done;
        tracing::info!(
            rounds = report.periods.len(),
            validators = report.total_by_validator.len(),
            owners = report.total_by_owner.len(),
            total_reward,
            "Rewards calculation complete"
        );
        Ok(report)
    }

    fn run_rounds(&mut self, sink: &mut dyn ReportSink) -> Result<()> {
        self.state = RunState::SelectingRounds;
        let bounds = self.source.performance_bounds()?;
        let latest = check_data_availability(self.plan, &bounds)?;
        let rounds = select_eligible_rounds(self.plan, latest);
        tracing::info!(
            eligible = rounds.len(),
            configured = self.plan.rounds().len(),
            latest_period = %latest,
            "Selected rounds with available performance data"
        );

        for round in &rounds {
            let report = self.process_round(round)?;
            sink.round_completed(&report)?;
        }
        Ok(())
    }

    /// Record a failure before handing the error back
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            if self.state != RunState::Failed {
                tracing::error!(state = ?self.state, %error, "Rewards calculation failed");
                self.state = RunState::Failed;
            }
        }
        result
    }

    /// Process one round: fetch activity, resolve rates, attach rewards,
    /// check consistency and fold the round into the ledgers
    ///
    /// The ledgers are only touched once every check of the round has
    /// passed.
    pub fn process_round(&mut self, round: &Round) -> Result<RoundReport> {
        self.state = RunState::ProcessingRound {
            index: self.periods.len(),
            period: round.period,
        };
        let result = self.compute_round(round);
        let (validators, owners, rates) = self.settle(result)?;

        // Fold into copies first: a total that cannot be converted to
        // smallest units must leave the ledgers as they were
        let mut validator_totals = self.validator_totals.clone();
        validator_totals.merge_all(&validators);
        let mut owner_totals = self.owner_totals.clone();
        owner_totals.merge_all(&owners);
        let cumulative = validator_totals
            .fixed_point()
            .and_then(|_| owner_totals.fixed_point());
        let cumulative = self.settle(cumulative)?;

        let period = round.period;
        self.validator_totals = validator_totals;
        self.owner_totals = owner_totals;
        self.by_validator.extend(
            validators
                .iter()
                .map(|v| RoundParticipation::new(period, v.clone())),
        );
        self.by_owner
            .extend(owners.iter().map(|o| RoundParticipation::new(period, o.clone())));
        self.periods.push(period);

        tracing::info!(
            period = %period,
            participations = validators.len(),
            tier = rates.tier.max_participants,
            daily_reward = rates.daily,
            monthly_reward = rates.monthly,
            annual_reward = rates.annual,
            "Calculated rewards for round"
        );

        Ok(RoundReport {
            round: *round,
            rates,
            validators,
            owners,
            cumulative,
        })
    }

    fn compute_round(
        &self,
        round: &Round,
    ) -> Result<(Vec<ValidatorParticipation>, Vec<OwnerParticipation>, RewardRates)> {
        let period = round.period;
        let query = self.settings.query(period);
        let mut validators = self.source.validator_activity(&query)?;
        let mut owners = self.source.owner_activity(&query)?;
        tracing::debug!(
            period = %period,
            validators = validators.len(),
            owners = owners.len(),
            "Fetched participations"
        );

        let rates = self.plan.reward_rates(period, validators.len() as i64)?;

        for validator in &mut validators {
            validator.set_reward(rates.daily * validator.active_days as f64);
        }
        for owner in &mut owners {
            owner.set_reward(rates.daily * owner.active_days as f64);
        }

        // Active days per owner, summed over its validators
        let mut owner_days: BTreeMap<&str, u64> = BTreeMap::new();
        for validator in &validators {
            *owner_days.entry(validator.owner_address.as_str()).or_default() +=
                validator.active_days;
        }

        let mut reported = HashSet::new();
        for owner in &owners {
            let summed = owner_days
                .get(owner.owner_address.as_str())
                .copied()
                .unwrap_or(0);
            if owner.active_days != summed {
                return Err(RewardsError::InconsistentActiveDays {
                    period,
                    owner: owner.owner_address.clone(),
                    reported: owner.active_days,
                    summed,
                });
            }
            reported.insert(owner.owner_address.as_str());
        }

        let unreported = owner_days
            .iter()
            .find(|(owner, days)| **days > 0 && !reported.contains(**owner));
        if let Some((owner, summed)) = unreported {
            return Err(RewardsError::MissingOwnerRecord {
                period,
                owner: owner.to_string(),
                summed: *summed,
            });
        }

        Ok((validators, owners, rates))
    }

    fn finalize(&mut self) -> Result<FinalReport> {
        let cumulative_by_validator = self.validator_totals.fixed_point()?;
        let cumulative_by_owner = self.owner_totals.fixed_point()?;

        Ok(FinalReport {
            periods: std::mem::take(&mut self.periods),
            by_validator: std::mem::take(&mut self.by_validator),
            by_owner: std::mem::take(&mut self.by_owner),
            total_by_validator: std::mem::take(&mut self.validator_totals).into_values(),
            total_by_owner: std::mem::take(&mut self.owner_totals).into_values(),
            cumulative_by_validator,
            cumulative_by_owner,
        })
    }
}
