//! Status persistence
//!
//! Owns the output directory: it is emptied at the start of a publish run,
//! receives one JSON file of converted value sets per source file, and one
//! `status-<timestamp>.json` file per run holding the [`PublishOutcome`]s.

use crate::adapters::terminology::ValueSetResource;
use crate::domain::{PublishOutcome, Result, ValueSet};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

const STATUS_PREFIX: &str = "status-";

/// Output directory manager
pub struct StatusStore {
    output_dir: PathBuf,
}

impl StatusStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory if needed and removes every file in it
    ///
    /// Sub-directories are left alone. Returns the number of files removed.
    pub async fn clear(&self) -> Result<usize> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        tracing::debug!(
            dir = %self.output_dir.display(),
            removed = removed,
            "Cleared output directory"
        );
        Ok(removed)
    }

    /// Writes the converted value sets of one source file to `<stem>.json`
    pub async fn write_value_sets(
        &self,
        stem: &str,
        value_sets: &[ValueSet],
        canonical_base: &str,
    ) -> Result<PathBuf> {
        let resources: Vec<ValueSetResource> = value_sets
            .iter()
            .map(|vs| ValueSetResource::from_value_set(vs, canonical_base))
            .collect();

        let path = self.output_dir.join(format!("{stem}.json"));
        let json = serde_json::to_string_pretty(&resources)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Persists the outcomes of a run under a timestamped name
    pub async fn save_status(&self, outcomes: &[PublishOutcome]) -> Result<PathBuf> {
        self.save_status_at(outcomes, Utc::now()).await
    }

    async fn save_status_at(
        &self,
        outcomes: &[PublishOutcome],
        at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let name = format!("{STATUS_PREFIX}{}.json", at.format("%Y%m%dT%H%M%S%3fZ"));
        let path = self.output_dir.join(name);
        let json = serde_json::to_string_pretty(outcomes)?;
        tokio::fs::write(&path, json).await?;

        tracing::info!(path = %path.display(), "Saved publish status");
        Ok(path)
    }

    /// Loads the most recent status file, if any
    ///
    /// Status file names sort chronologically, so the latest is the greatest.
    pub async fn latest_status(&self) -> Result<Option<(PathBuf, Vec<PublishOutcome>)>> {
        if !tokio::fs::try_exists(&self.output_dir).await? {
            return Ok(None);
        }

        let mut latest: Option<PathBuf> = None;
        let mut entries = tokio::fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_status = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(STATUS_PREFIX) && n.ends_with(".json"));
            if is_status && latest.as_ref().map_or(true, |l| path > *l) {
                latest = Some(path);
            }
        }

        let Some(path) = latest else {
            return Ok(None);
        };
        let content = tokio::fs::read_to_string(&path).await?;
        let outcomes: Vec<PublishOutcome> = serde_json::from_str(&content)?;
        Ok(Some((path, outcomes)))
    }
}

/// Renders per-value-set counts, one line each
pub fn render_status(outcomes: &[PublishOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let marker = if outcome.is_success() { "OK    " } else { "FAILED" };
        out.push_str(&format!(
            "{marker} {} ({}): {} succeeded, {} failed\n",
            outcome.value_set.name,
            outcome.value_set.identifier,
            outcome.succeeded_count(),
            outcome.failed_count()
        ));
    }
    out
}
