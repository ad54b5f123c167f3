//! Configuration schema types
//!
//! This module defines the configuration structure. Every section has defaults
//! so a run can be configured from environment variables alone; the two
//! endpoint URLs are the only values without a usable default.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Main configuration
///
/// Constructed once at startup and passed by reference into the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Terminology server (value set store)
    #[serde(default)]
    pub terminology: TerminologyConfig,

    /// Clinical-records server
    #[serde(default)]
    pub clinical: ClinicalConfig,

    /// Publisher pacing
    #[serde(default)]
    pub publish: PublishConfig,

    /// Source and output directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.clinical.validate()?;
        self.terminology.validate()?;
        self.publish.validate()?;
        self.paths.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Terminology server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminologyConfig {
    /// ValueSet endpoint; members are POSTed here and value sets read back from it
    #[serde(default)]
    pub valueset_url: String,

    /// Username for Basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for Basic authentication (optional)
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Prefix used to build the canonical `url` of each value set
    #[serde(default = "default_canonical_base")]
    pub canonical_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for TerminologyConfig {
    fn default() -> Self {
        Self {
            valueset_url: String::new(),
            username: None,
            password: None,
            canonical_base: default_canonical_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl TerminologyConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url(
            "SNOWSTORM_VALUESET_URL (terminology.valueset_url)",
            &self.valueset_url,
        )?;
        if self.timeout_seconds == 0 {
            return Err("terminology.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Clinical-records server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalConfig {
    /// Base URL of the server
    #[serde(default)]
    pub base_url: String,

    /// Username for Basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for Basic authentication (optional)
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Path of the procedure-order concept endpoint (read and push)
    #[serde(default = "default_concepts_path")]
    pub concepts_path: String,

    /// Path of the body-site endpoint (delete)
    #[serde(default = "default_body_sites_path")]
    pub body_sites_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification
    ///
    /// Bahmni demo installs commonly use self-signed certificates; disabling
    /// verification is only meant for those.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for ClinicalConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            concepts_path: default_concepts_path(),
            body_sites_path: default_body_sites_path(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

impl ClinicalConfig {
    fn validate(&self) -> Result<(), String> {
        validate_url("BAHMNI_SERVER_URL (clinical.base_url)", &self.base_url)?;
        for (name, path) in [
            ("clinical.concepts_path", &self.concepts_path),
            ("clinical.body_sites_path", &self.body_sites_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{name} must start with '/', got '{path}'"));
            }
        }
        if self.timeout_seconds == 0 {
            return Err("clinical.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// How the publisher spaces member requests within one value set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayPolicy {
    /// Wait `n * base_delay_ms` before the n-th member (1-indexed)
    #[default]
    Linear,
    /// Wait `base_delay_ms` before every member
    Flat,
}

impl fmt::Display for DelayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for DelayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "flat" => Ok(Self::Flat),
            _ => Err(format!(
                "Invalid delay policy '{s}'. Must be one of: linear, flat"
            )),
        }
    }
}

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Base delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Delay policy
    #[serde(default)]
    pub delay_policy: DelayPolicy,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            delay_policy: DelayPolicy::default(),
        }
    }
}

impl PublishConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_delay_ms > 60_000 {
            return Err(format!(
                "publish.base_delay_ms must be <= 60000, got {}",
                self.base_delay_ms
            ));
        }
        Ok(())
    }
}

/// Local directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for `*.csv` source files
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Directory receiving converted value sets and status files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.source_dir.trim().is_empty() {
            return Err("paths.source_dir cannot be empty".to_string());
        }
        if self.output_dir.trim().is_empty() {
            return Err("paths.output_dir cannot be empty".to_string());
        }
        if normalized_dir(&self.source_dir) == normalized_dir(&self.output_dir) {
            return Err(
                "paths.output_dir must differ from paths.source_dir (it is cleared on publish)"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Resolves a directory for comparison
///
/// Existing directories are canonicalized so symlinks and relative spellings
/// match; otherwise `.` components and `..` after a normal component are
/// folded lexically.
fn normalized_dir(dir: &str) -> PathBuf {
    let path = Path::new(dir.trim());
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) =>
            {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Value for {name} is not provided"));
    }
    let parsed = url::Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("{name} must start with http:// or https://"));
    }
    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_canonical_base() -> String {
    "http://bahmni.org/fhir/ValueSet".to_string()
}

fn default_concepts_path() -> String {
    "/openmrs/ws/rest/v1/bahmni/procedure-orders/concepts".to_string()
}

fn default_body_sites_path() -> String {
    "/openmrs/ws/rest/v1/bahmni/procedure-orders/body-sites".to_string()
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_source_dir() -> String {
    "public".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
