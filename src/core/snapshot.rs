//! Snapshot fetcher
//!
//! Reads the clinical-records server's procedure-order concepts into a
//! [`ConceptSnapshot`]. A failed read is returned as an error; no partial
//! snapshot is ever produced.

use crate::adapters::clinical::ClinicalRecordsServer;
use crate::domain::{ConceptSnapshot, ConceptSource, Result};
use std::fmt::Write as _;
use std::sync::Arc;

/// Takes concept snapshots from a clinical-records server
pub struct SnapshotFetcher {
    server: Arc<dyn ClinicalRecordsServer>,
}

impl SnapshotFetcher {
    pub fn new(server: Arc<dyn ClinicalRecordsServer>) -> Self {
        Self { server }
    }

    /// Fetches the current concepts
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SyncError::Fetch`] if the remote read fails.
    pub async fn take(&self) -> Result<ConceptSnapshot> {
        let concepts = self.server.fetch_concepts().await?;
        let received = concepts.len();
        let snapshot = ConceptSnapshot::from_concepts(concepts);

        if snapshot.len() < received {
            tracing::warn!(
                received = received,
                unique = snapshot.len(),
                "Duplicate concept codes in response; kept first of each"
            );
        }

        tracing::info!(
            endpoint = %self.server.endpoint(),
            concepts = snapshot.len(),
            "Concept snapshot taken"
        );
        Ok(snapshot)
    }
}

/// Renders a snapshot grouped by source
pub fn render_snapshot(snapshot: &ConceptSnapshot) -> String {
    let mut out = String::new();
    for source in [ConceptSource::Procedure, ConceptSource::BodySite] {
        let concepts: Vec<_> = snapshot.by_source(source).collect();
        let _ = writeln!(out, "{source} ({})", concepts.len());
        for concept in concepts {
            let _ = writeln!(out, "  {}  {}", concept.code, concept.display);
        }
    }
    out
}
