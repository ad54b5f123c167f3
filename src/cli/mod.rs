//! CLI interface and argument parsing
//!
//! Running without a subcommand publishes the CSV sources.

pub mod commands;

use clap::{Parser, Subcommand};

/// Body-site and procedure value set sync
#[derive(Parser, Debug)]
#[command(name = "procedures-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "procedures.toml", env = "PROCEDURES_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PROCEDURES_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `publish`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the CSV sources and publish them to the terminology server
    Publish(commands::run::PublishArgs),

    /// Push the terminology server's value sets into Bahmni
    Sync(commands::run::SyncArgs),

    /// List the procedure-order concepts currently in Bahmni
    Fetch(commands::run::FetchArgs),

    /// Show the most recent publish status
    Status(commands::status::StatusArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),
}
