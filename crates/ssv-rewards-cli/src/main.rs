//! SSV Rewards CLI
//!
//! Command-line interface for calculating tiered SSV staking rewards.

mod export;
mod settings;
mod snapshot;

use anyhow::Context;
use clap::{Parser, Subcommand};
use export::DirectoryExporter;
use settings::{LoggingSettings, Settings};
use snapshot::SnapshotSource;
use ssv_rewards_core::period::Period;
use ssv_rewards_economics::Plan;
use ssv_rewards_engine::{AggregationEngine, EngineSettings, PerformanceProvider};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ssv-rewards")]
#[command(version)]
#[command(about = "Tiered SSV staking rewards calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file
    #[arg(short, long, global = true, env = "SSV_REWARDS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate rewards for every payable round
    Calc {
        /// Rewards plan document
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Activity snapshot directory
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Performance data provider: beaconcha or e2m
        #[arg(long)]
        performance_provider: Option<PerformanceProvider>,

        /// Minimum attestations per day (defaults to the plan's criteria)
        #[arg(long)]
        min_attestations_per_day: Option<u32>,
    },

    /// Validate a rewards plan and print its tiers and rounds
    Plan {
        /// Rewards plan document
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Show the reward rates of a round for a cohort size
    Rates {
        /// Rewards plan document
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Round period (YYYY-MM)
        #[arg(long)]
        period: Period,

        /// Number of participating validators
        #[arg(long, allow_negative_numbers = true)]
        participants: i64,
    },

    /// Write a settings file with default values
    InitConfig {
        /// Output file
        #[arg(short, long, default_value = "ssv-rewards.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Version information
    Version,
}

fn init_logging(verbose: bool, logging: &LoggingSettings) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false))
            .init();
    }
}

fn expand_path(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(rest) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}

fn load_plan(path: &Path) -> anyhow::Result<Plan> {
    let path = expand_path(path);
    let document = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read rewards plan {}", path.display()))?;
    let plan = Plan::from_yaml(&document)
        .with_context(|| format!("invalid rewards plan {}", path.display()))?;
    Ok(plan)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref().map(expand_path).as_deref())
        .context("failed to load settings")?;
    init_logging(cli.verbose, &settings.logging);

    match cli.command {
        Commands::Calc {
            plan,
            output_dir,
            data_dir,
            performance_provider,
            min_attestations_per_day,
        } => {
            let plan_path = plan.unwrap_or_else(|| settings.calc.plan.clone());
            let output_dir = expand_path(&output_dir.unwrap_or_else(|| settings.calc.output_dir.clone()));
            let data_dir = expand_path(&data_dir.unwrap_or_else(|| settings.source.data_dir.clone()));
            let provider = performance_provider.unwrap_or(settings.calc.performance_provider);

            let plan = load_plan(&plan_path)?;
            let mut engine_settings = EngineSettings::from_plan(&plan, provider);
            if let Some(min) = min_attestations_per_day.or(settings.calc.min_attestations_per_day) {
                engine_settings.min_attestations_per_day = min;
            }

            tracing::info!(
                plan = %plan_path.display(),
                data_dir = %data_dir.display(),
                output_dir = %output_dir.display(),
                provider = %provider,
                min_attestations_per_day = engine_settings.min_attestations_per_day,
                "Calculating rewards"
            );

            let source = SnapshotSource::open(&data_dir)?;
            let mut exporter = DirectoryExporter::new(&output_dir);
            let report = AggregationEngine::new(&plan, source, engine_settings).run(&mut exporter)?;

            println!("Rewards calculated for {} round(s)", report.periods.len());
            for period in &report.periods {
                println!("  {}", period);
            }
            println!("Owners: {}", report.total_by_owner.len());
            println!("Validators: {}", report.total_by_validator.len());
            println!("Output: {}", output_dir.display());
        }

        Commands::Plan { plan } => {
            let plan_path = plan.unwrap_or_else(|| settings.calc.plan.clone());
            let plan = load_plan(&plan_path)?;
            let criteria = plan.criteria();

            println!("Plan: {}", plan_path.display());
            println!("");
            println!("Criteria:");
            println!("  Min attestations per day: {}", criteria.min_attestations_per_day);
            println!("  Min decideds per day: {}", criteria.min_decideds_per_day);
            println!("");
            println!("Tiers:");
            for tier in plan.tiers().iter() {
                println!("  <= {:>8} validators  apr boost {}", tier.max_participants, tier.apr_boost);
            }
            println!("");
            println!("Rounds:");
            for round in plan.rounds().iter() {
                let status = if round.is_complete() { "" } else { "  (rates pending)" };
                println!(
                    "  {}  eth apr {}  ssv/eth {}{}",
                    round.period, round.eth_apr, round.ssv_eth, status
                );
            }
        }

        Commands::Rates { plan, period, participants } => {
            let plan_path = plan.unwrap_or_else(|| settings.calc.plan.clone());
            let plan = load_plan(&plan_path)?;
            let rates = plan.reward_rates(period, participants)?;

            println!("Period: {} ({} days)", period, period.days());
            println!("Participants: {}", participants);
            println!(
                "Tier: <= {} validators, apr boost {}",
                rates.tier.max_participants, rates.tier.apr_boost
            );
            println!("Annual reward: {} SSV", rates.annual);
            println!("Monthly reward: {} SSV", rates.monthly);
            println!("Daily reward: {} SSV", rates.daily);
        }

        Commands::InitConfig { output, force } => {
            let output = expand_path(&output);
            if output.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
            }
            let rendered = toml::to_string_pretty(&Settings::default())?;
            std::fs::write(&output, rendered)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Settings written to {}", output.display());
        }

        Commands::Version => {
            println!("ssv-rewards v{}", env!("CARGO_PKG_VERSION"));
            println!("");
            println!("Performance providers: beaconcha, e2m");
            println!("Reward token decimals: {}", ssv_rewards_economics::DECIMALS);
        }
    }

    Ok(())
}
