//! Validate config command implementation

use crate::config::SyncConfig;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validated the configuration; this prints a summary.
    pub async fn execute(&self, config: &SyncConfig, config_path: &str) -> anyhow::Result<i32> {
        println!("✅ Configuration is valid ({config_path})");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Terminology ValueSet URL: {}", config.terminology.valueset_url);
        println!(
            "  Terminology Auth: {}",
            auth_label(config.terminology.username.as_deref())
        );
        println!("  Bahmni Server: {}", config.clinical.base_url);
        println!(
            "  Bahmni Auth: {}",
            auth_label(config.clinical.username.as_deref())
        );
        println!("  TLS Verify: {}", config.clinical.tls_verify);
        println!(
            "  Delay: {} ms ({})",
            config.publish.base_delay_ms, config.publish.delay_policy
        );
        println!("  Source Dir: {}", config.paths.source_dir);
        println!("  Output Dir: {}", config.paths.output_dir);
        Ok(0)
    }
}

fn auth_label(username: Option<&str>) -> String {
    match username {
        Some(user) => format!("basic ({user})"),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_label() {
        assert_eq!(auth_label(Some("superman")), "basic (superman)");
        assert_eq!(auth_label(None), "none");
    }
}
