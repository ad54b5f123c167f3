//! Domain error types
//!
//! This module defines the error hierarchy for the synchronization engine.
//! Component errors never expose third-party HTTP or CSV types directly; they
//! are converted into domain variants at the adapter boundary.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
/// It wraps the component-specific errors and provides context for the
/// top-level exit code decision.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A source row could not be normalized
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecordError),

    /// A single member could not be created on the terminology server
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Snapshot or remote read failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// CSV source errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised by the record normalizer
///
/// `row` is the 1-indexed data row (the header line is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecordError {
    /// A required column is absent from the row
    #[error("row {row}: missing required column '{column}'")]
    MissingColumn { row: usize, column: String },

    /// The code column is present but blank after trimming
    #[error("row {row}: code is empty")]
    EmptyCode { row: usize },

    /// The source could not decode the row (bad encoding or quoting)
    #[error("row {row}: unreadable: {message}")]
    Unreadable { row: usize, message: String },
}

impl MalformedRecordError {
    /// Row number the error refers to
    pub fn row(&self) -> usize {
        match self {
            Self::MissingColumn { row, .. }
            | Self::EmptyCode { row }
            | Self::Unreadable { row, .. } => *row,
        }
    }
}

/// Failure to create one value-set member on the terminology server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("member '{code}' failed{}: {cause}", status_suffix(.http_status))]
pub struct PublishError {
    /// Member code that was being created
    pub code: String,

    /// HTTP status returned by the server, if a response was received
    pub http_status: Option<u16>,

    /// Underlying cause
    pub cause: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

impl PublishError {
    /// Creates a publish error without an HTTP status (transport failure)
    pub fn transport(code: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            http_status: None,
            cause: cause.into(),
        }
    }

    /// Creates a publish error for a non-2xx response
    pub fn status(code: impl Into<String>, status: u16, cause: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            http_status: Some(status),
            cause: cause.into(),
        }
    }
}

/// Errors that occur when talking to a remote server
///
/// Used for snapshot reads and for the clinical-records write calls; any of
/// them ends the run.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Failed to reach the server
    #[error("Failed to connect to {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Server answered with a non-success status
    #[error("Server returned {status} for {url}: {message}")]
    ServerError {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SyncError {
    fn from(err: csv::Error) -> Self {
        SyncError::Csv(err.to_string())
    }
}
