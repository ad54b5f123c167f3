//! Run commands: `publish` (default), `sync` and `fetch`

use crate::adapters::status::render_status;
use crate::config::{DelayPolicy, SyncConfig};
use crate::core::snapshot::render_snapshot;
use crate::core::sync::{RunReport, SyncCoordinator, SyncMode};
use crate::log_error_with_context;
use clap::Args;
use std::str::FromStr;

/// Arguments for the publish command
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Override the base delay between member requests
    #[arg(long)]
    pub base_delay_ms: Option<u64>,

    /// Override the delay policy (linear or flat)
    #[arg(long)]
    pub delay_policy: Option<String>,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(&self, config: &SyncConfig) -> anyhow::Result<i32> {
        let mut config = config.clone();

        if let Some(ms) = self.base_delay_ms {
            tracing::info!(base_delay_ms = ms, "Overriding base delay from CLI");
            config.publish.base_delay_ms = ms;
        }

        if let Some(policy) = &self.delay_policy {
            match DelayPolicy::from_str(policy) {
                Ok(p) => config.publish.delay_policy = p,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(2);
                }
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        run_mode(&config, SyncMode::PublishNew).await
    }
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config: &SyncConfig) -> anyhow::Result<i32> {
        run_mode(config, SyncMode::SyncFromTerminology).await
    }
}

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, config: &SyncConfig) -> anyhow::Result<i32> {
        run_mode(config, SyncMode::FetchOnly).await
    }
}

/// Runs the coordinator in `mode` and prints its report
///
/// Exit codes: 0 on completion (member failures included), 2 when the
/// clients cannot be built, 5 when the run fails.
async fn run_mode(config: &SyncConfig, mode: SyncMode) -> anyhow::Result<i32> {
    let coordinator = match SyncCoordinator::from_config(config) {
        Ok(c) => c,
        Err(e) => {
            log_error_with_context!(&e, "Failed to initialize clients");
            eprintln!("Failed to initialize: {e}");
            return Ok(2);
        }
    };

    println!("🚀 Starting {mode} run...");
    println!();

    match coordinator.run(mode).await {
        Ok(report) => {
            print_report(&report);
            Ok(0)
        }
        Err(e) => {
            log_error_with_context!(&e, "Run failed");
            eprintln!("❌ Run failed: {e}");
            Ok(5)
        }
    }
}

fn print_report(report: &RunReport) {
    match report.mode {
        SyncMode::FetchOnly => {
            println!("📋 Procedure-order concepts ({}):", report.before.len());
            print!("{}", render_snapshot(&report.before));
        }
        SyncMode::PublishNew => {
            if report.outcomes.is_empty() {
                println!("No value sets published.");
            } else {
                println!("📊 Publish Summary:");
                print!("{}", render_status(&report.outcomes));
                println!("  Failed members: {}", report.failed_members());
            }
            if !report.skipped_records.is_empty() {
                println!();
                println!("⚠️  Skipped source rows:");
                for skipped in &report.skipped_records {
                    println!("  - {}: {}", skipped.file, skipped.error);
                }
            }
            if let Some(path) = &report.status_file {
                println!("  Status saved to {}", path.display());
            }
        }
        SyncMode::SyncFromTerminology => {
            println!("📊 Pushed {} concepts to Bahmni", report.pushed_concepts);
        }
    }

    if let Some(diff) = &report.diff {
        println!();
        println!("🔍 Concept changes:");
        print!("{}", diff.render());
    }

    println!();
    println!("Duration: {:.2}s", report.duration.as_secs_f64());
}
