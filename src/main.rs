// Procedures Sync - Body-site/procedure value sets for Bahmni
// Copyright (c) 2025 Procedures Sync Contributors
// Licensed under the MIT License

use clap::Parser;
use procedures_sync::cli::commands::run::PublishArgs;
use procedures_sync::cli::{Cli, Commands};
use procedures_sync::config::{load_config, LoggingConfig, SyncConfig};
use procedures_sync::log_error_with_context;
use procedures_sync::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Configuration errors are reported after logging is up
    let loaded = load_config(&cli.config);

    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Procedures Sync");

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context!(&e, "Failed to load configuration");
            eprintln!("❌ {e}");
            drop(guard);
            process::exit(2);
        }
    };

    let exit_code = match execute_command(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: &SyncConfig) -> anyhow::Result<i32> {
    match &cli.command {
        None => PublishArgs::default().execute(config).await,
        Some(Commands::Publish(args)) => args.execute(config).await,
        Some(Commands::Sync(args)) => args.execute(config).await,
        Some(Commands::Fetch(args)) => args.execute(config).await,
        Some(Commands::Status(args)) => args.execute(config).await,
        Some(Commands::ValidateConfig(args)) => args.execute(config, &cli.config).await,
    }
}
