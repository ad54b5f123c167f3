//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional
//! JSON file layer with rotation.
//!
//! # Example
//!
//! ```no_run
//! use procedures_sync::config::LoggingConfig;
//! use procedures_sync::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(value_sets = 3, "Publishing value sets");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use procedures_sync::log_error_with_context;
/// use procedures_sync::domain::SyncError;
///
/// let error = SyncError::Configuration("BAHMNI_SERVER_URL is not set".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
