//! AOG analytics command-line tool.
//!
//! Runs the imported-event migration or prints a fleet downtime report over a
//! JSON events file, using the in-memory repository. Without an input file the
//! repository is built from configuration (`[repository] seed_file`).
//!
//! # Usage
//!
//! ```bash
//! # Backfill imported events and write the migrated file
//! aog-analytics migrate events.json migrated.json
//!
//! # Breakdown, stage analytics and risk ranking as JSON
//! aog-analytics report events.json --as-of 2024-06-30T00:00:00Z
//!
//! # Report over the configured seed file
//! AOG_CONFIG=aog.toml aog-analytics report
//! ```
//!
//! # Environment Variables
//!
//! - `AOG_CONFIG`: Path to an `aog.toml` (otherwise searched in standard locations)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use aog_rust::db::{self, AppConfig, EventFilter, EventRepository, RepositoryFactory};
use aog_rust::io::{write_events_to_file, EventDataset};
use aog_rust::models::{
    DowntimeSlice, MonthlyDowntime, RiskScoreResult, StageAnalytics, ThreeBucketBreakdown,
};

const USAGE: &str = "usage:\n  aog-analytics migrate [input.json [output.json]]\n  aog-analytics report [input.json] [--as-of <RFC3339>]";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FleetReport {
    as_of: DateTime<Utc>,
    breakdown: ThreeBucketBreakdown,
    slices: Vec<DowntimeSlice>,
    monthly_trend: Vec<MonthlyDowntime>,
    stages: StageAnalytics,
    risk_ranking: Vec<RiskScoreResult>,
}

fn load_config() -> Result<AppConfig> {
    match AppConfig::from_default_location() {
        Ok(config) => Ok(config),
        // An explicitly named file must load.
        Err(e) if env::var(db::repo_config::CONFIG_PATH_ENV).is_ok() => {
            Err(e).context("Failed to load configuration")
        }
        Err(e) => {
            info!("Using default configuration ({})", e);
            Ok(AppConfig::default())
        }
    }
}

async fn load_repository(
    input: Option<&str>,
    config: &AppConfig,
) -> Result<Arc<dyn EventRepository>> {
    match input {
        Some(path) => {
            let repo = RepositoryFactory::create_seeded(path)
                .with_context(|| format!("Failed to load events from {}", path))?;
            Ok(repo as Arc<dyn EventRepository>)
        }
        None => {
            if config.repository.seed_file.is_none() {
                warn!("No input file and no seed_file configured; repository is empty");
            }
            RepositoryFactory::from_config(config)
                .await
                .context("Failed to create repository from configuration")
        }
    }
}

async fn run_migrate(input: Option<&str>, output: Option<&str>, config: &AppConfig) -> Result<()> {
    let repo = load_repository(input, config).await?;
    let report = db::migrate_imported_events(repo.as_ref()).await?;
    if report.errors > 0 {
        warn!("{} events could not be migrated", report.errors);
    }

    let dataset = EventDataset {
        aircraft: repo.list_aircraft().await?,
        events: repo.list_events(&EventFilter::all()).await?,
    };

    match output {
        Some(path) => {
            write_events_to_file(path, &dataset)?;
            info!("Wrote {} events to {}", dataset.events.len(), path);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&dataset)?),
    }
    Ok(())
}

async fn run_report(input: Option<&str>, as_of: DateTime<Utc>, config: &AppConfig) -> Result<()> {
    let repo = load_repository(input, config).await?;
    let repo = repo.as_ref();
    let filter = EventFilter::all();

    let breakdown = db::get_three_bucket_breakdown(repo, &filter).await?;
    let report = FleetReport {
        as_of,
        slices: breakdown.slices(),
        breakdown,
        monthly_trend: db::get_monthly_trend(repo, &filter).await?,
        stages: db::get_stage_analytics(repo, &filter).await?,
        risk_ranking: db::get_fleet_risk_ranking(
            repo,
            &filter,
            as_of,
            &config.analytics.risk_settings(),
            config.analytics.top_risk_count,
        )
        .await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn parse_as_of(args: &[String]) -> Result<DateTime<Utc>> {
    match args {
        [] => Ok(Utc::now()),
        [flag, value] if flag == "--as-of" => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --as-of timestamp: {}", value)),
        _ => bail!("{}", USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = load_config()?;

    match args.as_slice() {
        [cmd] if cmd == "migrate" => run_migrate(None, None, &config).await,
        [cmd, input] if cmd == "migrate" => run_migrate(Some(input.as_str()), None, &config).await,
        [cmd, input, output] if cmd == "migrate" => {
            run_migrate(Some(input.as_str()), Some(output.as_str()), &config).await
        }
        [cmd, rest @ ..] if cmd == "report" => {
            let (input, rest) = match rest {
                [first, tail @ ..] if !first.starts_with("--") => (Some(first.as_str()), tail),
                _ => (None, rest),
            };
            let as_of = parse_as_of(rest)?;
            run_report(input, as_of, &config).await
        }
        _ => bail!("{}", USAGE),
    }
}
