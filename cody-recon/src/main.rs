//! cody-recon - CodyStats reconciliation CLI
//!
//! Fetches the match schedule and scouted records from the CodyStats backend
//! plus the externally reported results for an event, reconciles them, and
//! prints a per-alliance agreement report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cody_common::config::ReconConfig;
use cody_common::types::{Alliance, MatchLevel, ScheduleEntry, ScoutedRecord};
use cody_recon::aggregate::{SourceState, Verdict};
use cody_recon::client::{BackendClient, ResultsClient};
use cody_recon::report::{alliance_report, ScoutedIndex};
use cody_recon::{FieldTable, Lookup, LookupCache};

#[derive(Parser)]
#[command(name = "cody-recon", version, about = "CodyStats scouting data reconciliation")]
struct Cli {
    /// Path to a config file (overrides CODYSTATS_CONFIG and defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare scouted totals against reported results for an event
    Check {
        /// Event key (e.g. "2025nyro")
        event: String,

        /// Restrict to one match level tag (e.g. "QM")
        #[arg(long)]
        level: Option<String>,

        /// Restrict to one match number
        #[arg(long)]
        match_number: Option<u32>,
    },
    /// Print the active season field table
    Fields,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = ReconConfig::load(cli.config.as_deref())?;

    let table = match &config.field_table {
        Some(path) => FieldTable::load(path)?,
        None => FieldTable::season_2025(),
    };

    match cli.command {
        Command::Fields => {
            for name in table.field_names() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Check {
            event,
            level,
            match_number,
        } => run_check(&config, table, &event, level.as_deref(), match_number).await,
    }
}

async fn run_check(
    config: &ReconConfig,
    table: FieldTable,
    event: &str,
    level: Option<&str>,
    match_number: Option<u32>,
) -> Result<()> {
    info!(event, season = config.season, "Starting reconciliation check");
    let started = chrono::Utc::now();

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let backend = BackendClient::new(&config.backend_url, timeout)?;
    let results = ResultsClient::new(&config.results_url, timeout)?;

    // Schedule is the backbone: without it there is nothing to report on
    let schedule = backend.fetch_schedule(event).await?;
    let level_filter = level.and_then(MatchLevel::parse);
    let entries: Vec<&ScheduleEntry> = schedule
        .iter()
        .filter(|e| level_filter.as_ref().map_or(true, |l| e.match_level == *l))
        .filter(|e| match_number.map_or(true, |n| e.match_number == n))
        .collect();
    info!(
        total = schedule.len(),
        selected = entries.len(),
        "Fetched schedule"
    );

    // External results: a failed fetch degrades to "not yet comparable"
    // rather than aborting the report
    let cache = LookupCache::new(table);
    let (lookup, external_state) = match results.fetch_event_results(config.season, event).await {
        Ok(payload) => (cache.lookup(&payload), SourceState::Ready),
        Err(e) => {
            warn!(error = %e, "Failed to fetch external results");
            (Arc::new(Lookup::default()), SourceState::Error)
        }
    };
    info!(records = lookup.len(), "Indexed external records");

    // Scouted records, fetched once per distinct team on the selected matches
    let mut teams: Vec<u32> = entries
        .iter()
        .flat_map(|e| e.red.iter().chain(e.blue.iter()).copied())
        .collect();
    teams.sort_unstable();
    teams.dedup();

    let mut scouted_records: Vec<ScoutedRecord> = Vec::new();
    let mut local_state = SourceState::Ready;
    for team in &teams {
        match backend.fetch_scouted(event, *team).await {
            Ok(records) => scouted_records.extend(records),
            Err(e) => {
                warn!(team = *team, error = %e, "Failed to fetch scouted records");
                local_state = SourceState::Error;
            }
        }
    }
    let scouted = ScoutedIndex::from_records(scouted_records);
    info!(records = scouted.len(), "Indexed scouted records");

    println!(
        "Reconciliation report for {} ({} matches, generated {})",
        event,
        entries.len(),
        started.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let table = cache.table();
    let overrides = cody_recon::overrides::OverrideMap::new();
    let mut mismatches = 0usize;
    for entry in &entries {
        for alliance in Alliance::both() {
            let report = alliance_report(
                entry,
                alliance,
                &scouted,
                &overrides,
                &lookup,
                table,
                local_state,
                external_state,
            );

            let verdict = report.verdict();
            println!(
                "{}-{} {:5} {}",
                entry.match_level,
                entry.match_number,
                alliance.label(),
                verdict_label(verdict)
            );

            for field in &report.fields {
                if field.comparison.verdict == Verdict::Mismatch {
                    mismatches += 1;
                    println!(
                        "    {:8} scouted {:>5} reported {:>5}",
                        field.field,
                        format_total(field.comparison.local),
                        format_total(field.comparison.external)
                    );
                }
            }
        }
    }

    info!(mismatches, "Reconciliation check complete");
    Ok(())
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Match => "ok",
        Verdict::Mismatch => "MISMATCH",
        Verdict::Pending => "no data",
    }
}

fn format_total(total: Option<f64>) -> String {
    match total {
        Some(v) => format!("{}", v),
        None => "-".to_string(),
    }
}
