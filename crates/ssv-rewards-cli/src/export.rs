//! Report export to a directory tree
//!
//! ```text
//! <output_dir>/
//! ├── <YYYY-MM>/
//! │   ├── by-validator.csv
//! │   ├── by-owner.csv
//! │   └── cumulative.json          owner totals after the round
//! ├── by-validator.csv             every round, with a leading period column
//! ├── by-owner.csv
//! ├── total-by-validator.csv
//! ├── total-by-owner.csv           validators as of the owner's first round
//! ├── cumulative.json              lifetime owner totals
//! └── cumulative-by-validator.json
//! ```
//!
//! Cumulative amounts are written as JSON integers in the token's smallest
//! unit, digit for digit.

use num_bigint::BigUint;
use serde::Serialize;
use ssv_rewards_core::error::{Result, RewardsError};
use ssv_rewards_core::period::Period;
use ssv_rewards_core::types::RoundParticipation;
use ssv_rewards_engine::{FinalReport, ReportSink, RoundReport};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Serialize)]
struct ValidatorRow<'a> {
    period: Period,
    owner_address: &'a str,
    public_key: &'a str,
    active_days: u64,
    reward: f64,
}

#[derive(Serialize)]
struct OwnerRow<'a> {
    period: Period,
    owner_address: &'a str,
    validators: u64,
    active_days: u64,
    reward: f64,
}

/// Sink writing every report as CSV and JSON files
pub struct DirectoryExporter {
    root: PathBuf,
}

impl DirectoryExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn create_dir(path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .map_err(|e| RewardsError::Export(format!("failed to create {}: {e}", path.display())))
    }
}

fn export_error(path: &Path, err: impl std::fmt::Display) -> RewardsError {
    RewardsError::Export(format!("failed to write {}: {err}", path.display()))
}

/// Write `rows` as CSV with a header row
fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| export_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| export_error(path, e))?;
    }
    writer.flush().map_err(|e| export_error(path, e))
}

/// Write `amounts` as a JSON object of exact integers
fn write_amounts(path: &Path, amounts: &BTreeMap<String, BigUint>) -> Result<()> {
    let mut object = serde_json::Map::new();
    for (key, amount) in amounts {
        let number =
            serde_json::Number::from_str(&amount.to_string()).map_err(|e| export_error(path, e))?;
        object.insert(key.clone(), serde_json::Value::Number(number));
    }

    let file = File::create(path).map_err(|e| export_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &serde_json::Value::Object(object))
        .map_err(|e| export_error(path, e))?;
    writer.flush().map_err(|e| export_error(path, e))
}

impl ReportSink for DirectoryExporter {
    fn round_completed(&mut self, report: &RoundReport) -> Result<()> {
        let dir = self.root.join(report.period().to_string());
        Self::create_dir(&dir)?;

        write_csv(&dir.join("by-validator.csv"), &report.validators)?;
        write_csv(&dir.join("by-owner.csv"), &report.owners)?;
        write_amounts(&dir.join("cumulative.json"), &report.cumulative)?;

        tracing::debug!(period = %report.period(), dir = %dir.display(), "Exported round");
        Ok(())
    }

    fn finished(&mut self, report: &FinalReport) -> Result<()> {
        Self::create_dir(&self.root)?;

        write_csv(
            &self.root.join("by-validator.csv"),
            report.by_validator.iter().map(|RoundParticipation { period, participation: v }| {
                ValidatorRow {
                    period: *period,
                    owner_address: &v.owner_address,
                    public_key: &v.public_key,
                    active_days: v.active_days,
                    reward: v.reward,
                }
            }),
        )?;
        write_csv(
            &self.root.join("by-owner.csv"),
            report.by_owner.iter().map(|RoundParticipation { period, participation: o }| {
                OwnerRow {
                    period: *period,
                    owner_address: &o.owner_address,
                    validators: o.validators,
                    active_days: o.active_days,
                    reward: o.reward,
                }
            }),
        )?;
        write_csv(&self.root.join("total-by-validator.csv"), &report.total_by_validator)?;
        write_csv(&self.root.join("total-by-owner.csv"), &report.total_by_owner)?;
        write_amounts(&self.root.join("cumulative.json"), &report.cumulative_by_owner)?;
        write_amounts(
            &self.root.join("cumulative-by-validator.json"),
            &report.cumulative_by_validator,
        )?;

        tracing::info!(dir = %self.root.display(), rounds = report.periods.len(), "Exported rewards");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssv_rewards_core::types::{OwnerParticipation, ValidatorParticipation};
    use ssv_rewards_economics::{RewardRates, Round, Tier};

    fn period() -> Period {
        "2023-06".parse().unwrap()
    }

    fn round_report() -> RoundReport {
        let mut validator = ValidatorParticipation::new("0xowner", "0xa", 30);
        validator.reward = 0.5;
        let mut owner = OwnerParticipation::new("0xowner", 1, 30);
        owner.reward = 0.5;

        let mut cumulative = BTreeMap::new();
        cumulative.insert(
            "0xowner".to_string(),
            BigUint::from_str("123456789012345678901234567890").unwrap(),
        );

        RoundReport {
            round: Round {
                period: period(),
                eth_apr: 0.05,
                ssv_eth: 0.004,
            },
            rates: RewardRates {
                tier: Tier {
                    max_participants: 100,
                    apr_boost: 1.0,
                },
                daily: 1.0,
                monthly: 30.0,
                annual: 360.0,
            },
            validators: vec![validator],
            owners: vec![owner],
            cumulative,
        }
    }

    #[test]
    fn test_round_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = DirectoryExporter::new(dir.path());
        exporter.round_completed(&round_report()).unwrap();

        let round_dir = dir.path().join("2023-06");
        let validators = fs::read_to_string(round_dir.join("by-validator.csv")).unwrap();
        assert_eq!(
            validators,
            "owner_address,public_key,active_days,reward\n0xowner,0xa,30,0.5\n"
        );

        let owners = fs::read_to_string(round_dir.join("by-owner.csv")).unwrap();
        assert!(owners.starts_with("owner_address,validators,active_days,reward\n"));

        let cumulative = fs::read_to_string(round_dir.join("cumulative.json")).unwrap();
        assert!(cumulative.contains("\"0xowner\": 123456789012345678901234567890"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_is_reported() {
        // Every write to /dev/full fails once the buffer is flushed
        let err = write_amounts(Path::new("/dev/full"), &round_report().cumulative).unwrap_err();
        assert!(matches!(err, RewardsError::Export(message) if message.contains("/dev/full")));
    }

    #[test]
    fn test_final_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = DirectoryExporter::new(dir.path().join("out"));

        let round = round_report();
        let report = FinalReport {
            periods: vec![period()],
            by_validator: round
                .validators
                .iter()
                .cloned()
                .map(|v| RoundParticipation::new(period(), v))
                .collect(),
            by_owner: round
                .owners
                .iter()
                .cloned()
                .map(|o| RoundParticipation::new(period(), o))
                .collect(),
            total_by_validator: round.validators.clone(),
            total_by_owner: round.owners.clone(),
            cumulative_by_validator: round.cumulative.clone(),
            cumulative_by_owner: round.cumulative.clone(),
        };
        exporter.finished(&report).unwrap();

        let root = exporter.root();
        let by_validator = fs::read_to_string(root.join("by-validator.csv")).unwrap();
        assert_eq!(
            by_validator,
            "period,owner_address,public_key,active_days,reward\n2023-06,0xowner,0xa,30,0.5\n"
        );
        let by_owner = fs::read_to_string(root.join("by-owner.csv")).unwrap();
        assert_eq!(
            by_owner,
            "period,owner_address,validators,active_days,reward\n2023-06,0xowner,1,30,0.5\n"
        );
        assert!(root.join("total-by-validator.csv").exists());
        assert!(root.join("total-by-owner.csv").exists());

        let cumulative: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.join("cumulative.json")).unwrap())
                .unwrap();
        assert_eq!(cumulative["0xowner"].to_string(), "123456789012345678901234567890");
        assert!(root.join("cumulative-by-validator.json").exists());
    }
}
