//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string_opt;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from an optional TOML file and the process environment
///
/// This function:
/// 1. Reads the TOML file if it exists (a missing file means "all defaults")
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Applies environment overrides (`BAHMNI_*`, `SNOWSTORM_*`, `PROCEDURES_*`)
/// 4. Validates the result
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] if the file cannot be parsed, a
/// referenced variable is unset, or a required endpoint is missing.
///
/// # Examples
///
/// ```no_run
/// use procedures_sync::config::load_config;
///
/// let config = load_config("procedures.toml").expect("Failed to load config");
/// println!("{}", config.clinical.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    load_config_with(path, &|key: &str| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit variable lookup
pub fn load_config_with(
    path: impl AsRef<Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<SyncConfig> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        let contents = substitute_env_vars(&contents, env)?;
        toml::from_str(&contents)
            .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?
    } else {
        tracing::debug!(
            path = %path.display(),
            "No configuration file found, using defaults and environment"
        );
        SyncConfig::default()
    };

    apply_env_overrides(&mut config, env)?;

    config.validate().map_err(SyncError::Configuration)?;

    Ok(config)
}

/// Substitutes placeholders in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched.
fn substitute_env_vars(input: &str, env: &dyn Fn(&str) -> Option<String>) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Other(format!("invalid placeholder pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let replaced = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match env(name) {
                Some(value) => value,
                None => {
                    if !missing_vars.iter().any(|v| v == name) {
                        missing_vars.push(name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&replaced);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment overrides
///
/// The endpoint variables keep the names operators already put in `.env`
/// files (`BAHMNI_SERVER_URL`, `SNOWSTORM_VALUESET_URL`); tuning knobs use the
/// `PROCEDURES_` prefix.
fn apply_env_overrides(
    config: &mut SyncConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(val) = env("PROCEDURES_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Terminology server
    if let Some(val) = env("SNOWSTORM_VALUESET_URL") {
        config.terminology.valueset_url = val;
    }
    if let Some(val) = env("SNOWSTORM_USERNAME") {
        config.terminology.username = Some(val);
    }
    if let Some(val) = env("SNOWSTORM_PASSWORD") {
        config.terminology.password = secret_string_opt(Some(val));
    }
    if let Some(val) = env("SNOWSTORM_CANONICAL_BASE") {
        config.terminology.canonical_base = val;
    }

    // Clinical-records server
    if let Some(val) = env("BAHMNI_SERVER_URL") {
        config.clinical.base_url = val;
    }
    if let Some(val) = env("BAHMNI_USERNAME") {
        config.clinical.username = Some(val);
    }
    if let Some(val) = env("BAHMNI_PASSWORD") {
        config.clinical.password = secret_string_opt(Some(val));
    }
    if let Some(val) = env("BAHMNI_TLS_VERIFY") {
        config.clinical.tls_verify = parse_bool("BAHMNI_TLS_VERIFY", &val)?;
    }

    // Publisher
    if let Some(val) = env("PROCEDURES_BASE_DELAY_MS") {
        config.publish.base_delay_ms = val.trim().parse().map_err(|_| {
            SyncError::Configuration(format!(
                "PROCEDURES_BASE_DELAY_MS must be a non-negative integer, got '{val}'"
            ))
        })?;
    }
    if let Some(val) = env("PROCEDURES_DELAY_POLICY") {
        config.publish.delay_policy = val.parse().map_err(SyncError::Configuration)?;
    }

    // Paths
    if let Some(val) = env("PROCEDURES_SOURCE_DIR") {
        config.paths.source_dir = val;
    }
    if let Some(val) = env("PROCEDURES_OUTPUT_DIR") {
        config.paths.output_dir = val;
    }

    // Logging
    if let Some(val) = env("PROCEDURES_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("PROCEDURES_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env("PROCEDURES_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SyncError::Configuration(format!(
            "{name} must be true or false, got '{value}'"
        ))),
    }
}
