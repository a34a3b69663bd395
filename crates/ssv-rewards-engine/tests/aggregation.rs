//! Integration tests for the rewards aggregation run
//!
//! These tests drive complete runs over an in-memory activity source and
//! check per-round reports, lifetime totals and fixed-point output.

use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigUint;
use ssv_rewards_core::error::{ErrorKind, RewardsError};
use ssv_rewards_core::period::Period;
use ssv_rewards_core::types::{OwnerParticipation, ValidatorParticipation};
use ssv_rewards_economics::Plan;
use ssv_rewards_engine::{
    AggregationEngine, EngineSettings, MemorySink, MemorySource, PerformanceBounds,
    PerformanceProvider,
};

const PLAN: &str = r#"
criteria:
  min_attestations_per_day: 202
  min_decideds_per_day: 22
tiers:
  - max_participants: 100
    apr_boost: 1.0
  - max_participants: 1000
    apr_boost: 0.9
rounds:
  - period: 2023-06
    eth_apr: 0.05
    ssv_eth: 0.004
  - period: 2023-07
    eth_apr: 0.04
    ssv_eth: 0.005
  - period: 2023-08
    eth_apr: 0.0
    ssv_eth: 0.0
  - period: 2023-09
    eth_apr: 0.04
    ssv_eth: 0.005
"#;

const PROVIDER: PerformanceProvider = PerformanceProvider::Beaconcha;

fn period(s: &str) -> Period {
    s.parse().unwrap()
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// `owners` owners with `per_owner` validators each, every validator active `days`
fn populate(source: &MemorySource, period: Period, owners: usize, per_owner: usize, days: u64) {
    let mut validators = Vec::new();
    let mut owner_records = Vec::new();
    for o in 0..owners {
        let owner = format!("0xowner{o:02}");
        for v in 0..per_owner {
            validators.push(ValidatorParticipation::new(
                owner.clone(),
                format!("0xvalidator{o:02}{v:04}"),
                days,
            ));
        }
        owner_records.push(OwnerParticipation::new(
            owner,
            per_owner as u64,
            per_owner as u64 * days,
        ));
    }
    source.put_validators(PROVIDER, period, validators);
    source.put_owners(PROVIDER, period, owner_records);
}

fn run(plan: &Plan, source: &MemorySource, sink: &mut MemorySink) -> Result<ssv_rewards_engine::FinalReport, RewardsError> {
    let settings = EngineSettings::from_plan(plan, PROVIDER);
    AggregationEngine::new(plan, source, settings).run(sink)
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_single_round_fifty_validators() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 6, 1), at(2023, 7, 10)));
        populate(&source, period("2023-06"), 5, 10, 30);

        let mut sink = MemorySink::default();
        let report = run(&plan, &source, &mut sink).unwrap();

        assert_eq!(report.periods, vec![period("2023-06")]);
        assert_eq!(sink.rounds.len(), 1);

        let round = &sink.rounds[0];
        assert_eq!(round.participants(), 50);
        assert_eq!(round.rates.tier.max_participants, 100);
        assert_eq!(round.rates.tier.apr_boost, 1.0);
        assert!((round.rates.annual - 400.0).abs() < 1e-9);
        assert!((round.rates.monthly - 33.333_333_333_333).abs() < 1e-9);
        assert!((round.rates.daily - 1.111_111_111_111).abs() < 1e-9);

        for validator in &round.validators {
            assert!((validator.reward - 33.333_333_333_333).abs() < 1e-9);
        }
        for owner in &round.owners {
            assert_eq!(owner.active_days, 300);
            assert!((owner.reward - 333.333_333_333_33).abs() < 1e-8);
        }

        assert_eq!(report.by_validator.len(), 50);
        assert_eq!(report.by_owner.len(), 5);
        assert_eq!(report.total_by_validator.len(), 50);
        assert_eq!(report.total_by_owner.len(), 5);
        assert_eq!(report.cumulative_by_owner.len(), 5);
        assert!(sink.report.is_some());
    }

    #[test]
    fn test_cohort_beyond_highest_tier_aborts_run() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 6, 1), at(2023, 7, 10)));
        populate(&source, period("2023-06"), 15, 100, 30);

        let mut sink = MemorySink::default();
        let err = run(&plan, &source, &mut sink).unwrap_err();

        assert_eq!(
            err,
            RewardsError::ParticipantsExceedHighestTier {
                participants: 1500,
                highest: 1000
            }
        );
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(sink.rounds.is_empty());
        assert!(sink.report.is_none());
    }

    #[test]
    fn test_empty_round_is_fatal() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 6, 1), at(2023, 7, 10)));

        let mut sink = MemorySink::default();
        let err = run(&plan, &source, &mut sink).unwrap_err();
        assert_eq!(err, RewardsError::NonPositiveParticipants(0));
        assert!(sink.rounds.is_empty());
    }
}

mod accumulation_tests {
    use super::*;

    fn source() -> MemorySource {
        // Data up to mid-October: June, July and September are payable,
        // August has no rates and October is still in progress.
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 5, 20), at(2023, 10, 15)));
        populate(&source, period("2023-06"), 2, 10, 30);
        populate(&source, period("2023-07"), 2, 60, 31);
        populate(&source, period("2023-08"), 2, 10, 31);
        populate(&source, period("2023-09"), 3, 10, 30);
        populate(&source, period("2023-10"), 3, 10, 15);
        source
    }

    #[test]
    fn test_only_eligible_rounds_are_processed() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let mut sink = MemorySink::default();
        let report = run(&plan, &source(), &mut sink).unwrap();

        assert_eq!(
            report.periods,
            vec![period("2023-06"), period("2023-07"), period("2023-09")]
        );
        let tiers: Vec<u64> = sink.rounds.iter().map(|r| r.rates.tier.max_participants).collect();
        assert_eq!(tiers, [100, 1000, 100]);
    }

    #[test]
    fn test_totals_accumulate_across_rounds() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let mut sink = MemorySink::default();
        let report = run(&plan, &source(), &mut sink).unwrap();

        // Validator 0 of owner 0 is active in every processed round
        let key = "0xvalidator000000";
        let expected: f64 = sink
            .rounds
            .iter()
            .flat_map(|r| r.validators.iter())
            .filter(|v| v.public_key == key)
            .map(|v| v.reward)
            .sum();
        let total = report
            .total_by_validator
            .iter()
            .find(|v| v.public_key == key)
            .unwrap();
        assert_eq!(total.active_days, 30 + 31 + 30);
        assert!((total.reward - expected).abs() < 1e-9);

        // Owner 0 ran 10, 60 and 10 validators; the total keeps the first count
        let first = report
            .total_by_owner
            .iter()
            .find(|o| o.owner_address == "0xowner00")
            .unwrap();
        assert_eq!(first.validators, 10);
        assert_eq!(first.active_days, 300 + 1860 + 300);

        // Owner 2 only appears in September
        let owner = report
            .total_by_owner
            .iter()
            .find(|o| o.owner_address == "0xowner02")
            .unwrap();
        assert_eq!(owner.active_days, 300);
        assert_eq!(owner.validators, 10);
    }

    #[test]
    fn test_round_cumulative_snapshots_grow() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let mut sink = MemorySink::default();
        let report = run(&plan, &source(), &mut sink).unwrap();

        let owner = "0xowner00";
        let snapshots: Vec<&BigUint> = sink.rounds.iter().map(|r| &r.cumulative[owner]).collect();
        assert!(snapshots.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(snapshots.last().copied(), report.cumulative_by_owner.get(owner));
        assert!(!sink.rounds[0].cumulative.contains_key("0xowner02"));
        assert!(sink.rounds[2].cumulative.contains_key("0xowner02"));
    }

    #[test]
    fn test_inconsistent_later_round_stops_run() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = source();
        source.put_owners(
            PROVIDER,
            period("2023-07"),
            vec![
                OwnerParticipation::new("0xowner00", 60, 1860),
                OwnerParticipation::new("0xowner01", 60, 1859),
            ],
        );

        let mut sink = MemorySink::default();
        let err = run(&plan, &source, &mut sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(err.to_string().contains("0xowner01"));
        assert_eq!(sink.rounds.len(), 1);
        assert!(sink.report.is_none());
    }
}

mod availability_tests {
    use super::*;

    #[test]
    fn test_missing_performance_data() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::default();
        let mut sink = MemorySink::default();

        let err = run(&plan, &source, &mut sink).unwrap_err();
        assert_eq!(err, RewardsError::PerformanceDataUnavailable);
        assert_eq!(err.kind(), ErrorKind::DataAvailability);
    }

    #[test]
    fn test_first_round_not_covered() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 6, 2), at(2023, 8, 1)));
        populate(&source, period("2023-06"), 1, 1, 29);

        let mut sink = MemorySink::default();
        let err = run(&plan, &source, &mut sink).unwrap_err();
        assert!(matches!(err, RewardsError::FirstRoundNotCovered { .. }));
        assert!(sink.rounds.is_empty());
    }

    #[test]
    fn test_nothing_payable_yet() {
        let plan = Plan::from_yaml(PLAN).unwrap();
        let source = MemorySource::new(PerformanceBounds::new(at(2023, 6, 1), at(2023, 6, 20)));

        let mut sink = MemorySink::default();
        let report = run(&plan, &source, &mut sink).unwrap();
        assert!(report.periods.is_empty());
        assert!(report.cumulative_by_owner.is_empty());
        assert!(sink.report.is_some());
    }
}
