//! Status command implementation
//!
//! Prints the most recent status file from the output directory.

use crate::adapters::status::{render_status, StatusStore};
use crate::config::SyncConfig;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the raw JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config: &SyncConfig) -> anyhow::Result<i32> {
        let store = StatusStore::new(&config.paths.output_dir);

        let latest = match store.latest_status().await {
            Ok(latest) => latest,
            Err(e) => {
                eprintln!("❌ Failed to read status: {e}");
                return Ok(5);
            }
        };

        let Some((path, outcomes)) = latest else {
            println!("No publish status found in {}.", store.output_dir().display());
            println!("Run 'procedures-sync publish' to publish value sets.");
            return Ok(0);
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            return Ok(0);
        }

        println!("📊 Publish Status ({})", path.display());
        println!();
        print!("{}", render_status(&outcomes));
        Ok(0)
    }
}
