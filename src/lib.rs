// Procedures Sync - Body-site/procedure value sets for Bahmni
// Copyright (c) 2025 Procedures Sync Contributors
// Licensed under the MIT License

//! # Procedures Sync
//!
//! Keeps body-site and procedure reference data consistent across three
//! places: the CSV files it is authored in, a FHIR terminology server that
//! stores it as value sets, and the Bahmni clinical-records server whose
//! procedure orders reference it.
//!
//! ## Overview
//!
//! - **Converting** CSV rows into value sets with stable identifiers
//! - **Publishing** value set members to the terminology server, one paced
//!   request at a time per value set
//! - **Syncing** the terminology server's value sets into Bahmni
//! - **Diffing** Bahmni's concepts before and after a run
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Normalizer, builder, publisher, snapshots, diff, orchestrator
//! - [`adapters`] - Terminology server, Bahmni, CSV sources, status files
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procedures_sync::config::load_config;
//! use procedures_sync::core::sync::{SyncCoordinator, SyncMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("procedures.toml")?;
//!     let coordinator = SyncCoordinator::from_config(&config)?;
//!
//!     let report = coordinator.run(SyncMode::PublishNew).await?;
//!     if let Some(diff) = &report.diff {
//!         println!("{}", diff.render());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. Member publish failures and
//! malformed source rows are recorded in the run report instead of being
//! raised; snapshot failures end the run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
