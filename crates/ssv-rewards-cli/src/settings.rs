//! CLI settings
//!
//! Loaded from an optional TOML file, then overridden by `SSV_REWARDS_*`
//! environment variables (`SSV_REWARDS_CALC__OUTPUT_DIR=./out`). Command-line
//! flags take precedence over both.

use serde::{Deserialize, Serialize};
use ssv_rewards_engine::PerformanceProvider;
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "SSV_REWARDS";

/// Complete CLI settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Calculation settings
    #[serde(default)]
    pub calc: CalcSettings,

    /// Activity snapshot settings
    #[serde(default)]
    pub source: SourceSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

/// Calculation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalcSettings {
    /// Rewards plan document
    #[serde(default = "default_plan")]
    pub plan: PathBuf,

    /// Directory reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Performance data provider
    #[serde(default)]
    pub performance_provider: PerformanceProvider,

    /// Overrides the plan's minimum attestations per day
    #[serde(default)]
    pub min_attestations_per_day: Option<u32>,
}

fn default_plan() -> PathBuf {
    PathBuf::from("rewards.yaml")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./rewards")
}

impl Default for CalcSettings {
    fn default() -> Self {
        Self {
            plan: default_plan(),
            output_dir: default_output_dir(),
            performance_provider: PerformanceProvider::default(),
            min_attestations_per_day: None,
        }
    }
}

/// Activity snapshot settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Snapshot root directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
