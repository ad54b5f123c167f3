//! Configuration management.
//!
//! The run is configured by an optional TOML file plus environment variables.
//! The two endpoint URLs (`BAHMNI_SERVER_URL`, `SNOWSTORM_VALUESET_URL`) are
//! required; everything else has a default.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use procedures_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("procedures.toml")?;
//! println!("Terminology server: {}", config.terminology.valueset_url);
//! println!("Base delay: {}ms", config.publish.base_delay_ms);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [clinical]
//! base_url = "https://bahmni.example.org"
//! username = "superman"
//! password = "${BAHMNI_PASSWORD}"
//!
//! [terminology]
//! valueset_url = "http://snowstorm-lite:8080/fhir/ValueSet"
//!
//! [publish]
//! base_delay_ms = 1000
//! delay_policy = "linear"
//!
//! [paths]
//! source_dir = "public"
//! output_dir = "output"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_with};
pub use schema::{
    ApplicationConfig, ClinicalConfig, DelayPolicy, LoggingConfig, PathsConfig, PublishConfig,
    SyncConfig, TerminologyConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
