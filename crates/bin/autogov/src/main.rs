//! # autogov — automation governance analyzer
//!
//! Composition root that wires the CSV adapter into the analysis service
//! and renders the resulting report.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Install the tracing subscriber
//! - Construct the record source and report writer (adapters)
//! - Construct the analysis service, injecting the source via its port trait
//! - Print the report as text or JSON, optionally exporting CSV views
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod render;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use autogov_adapter_csv::{CsvRecordSource, CsvReportWriter};
use autogov_app::filter::RecordFilter;
use autogov_app::services::analysis::AnalysisService;
use autogov_domain::action::SuggestedAction;
use autogov_domain::time::{self, Timestamp};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// autogov - assess scheduled automations and suggest what to clean up
#[derive(Parser, Debug)]
#[command(name = "autogov")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Automation export (delimited text with a header row)
    input: PathBuf,

    /// Path to configuration file [default: autogov.toml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference time for ages, as RFC 3339 [default: now]
    #[arg(long, value_parser = parse_now)]
    now: Option<Timestamp>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also write the report views as CSV files into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Keep only these business units (repeatable)
    #[arg(long = "business-unit")]
    business_units: Vec<String>,

    /// Keep only these suggested actions, by label (repeatable)
    #[arg(long = "action", value_parser = parse_action)]
    actions: Vec<SuggestedAction>,

    /// Keep only these schedule groups, `Blank` included (repeatable)
    #[arg(long = "schedule")]
    schedule_groups: Vec<String>,

    /// Keep only names containing this text (case-insensitive)
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            business_units: self.business_units.clone(),
            actions: self.actions.clone(),
            schedule_groups: self.schedule_groups.clone(),
            name_search: self.search.clone(),
        }
    }
}

fn parse_now(value: &str) -> Result<Timestamp, String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

fn parse_action(value: &str) -> Result<SuggestedAction, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let filter =
        EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let raw = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let source = CsvRecordSource::new(&config.ingest).context("invalid ingest configuration")?;
    let service = AnalysisService::new(source, config.report_settings())
        .context("invalid analysis settings")?;

    let now = cli.now.unwrap_or_else(time::now);
    let record_filter = cli.record_filter();
    let report = match &cli.export_dir {
        Some(dir) => {
            let writer = CsvReportWriter::new(dir);
            service.analyze_and_export(&raw, now, &record_filter, &[&writer])
        }
        None => service.analyze(&raw, now, &record_filter),
    }
    .with_context(|| format!("failed to analyze {}", cli.input.display()))?;

    let mut stdout = std::io::stdout().lock();
    match cli.format {
        OutputFormat::Text => render::write_text(&mut stdout, &report)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }
    if let Some(dir) = &cli.export_dir {
        tracing::info!(dir = %dir.display(), "views exported");
    }
    Ok(())
}
