//! Clinical-records server trait definition

use crate::domain::{Concept, FetchError};
use async_trait::async_trait;

/// Trait for clinical-records server implementations
///
/// The engine only needs three calls: read the procedure-order concept
/// references, delete the body-site concepts, and push a concept set.
#[async_trait]
pub trait ClinicalRecordsServer: Send + Sync {
    /// Reads the concepts currently referenced by procedure orders
    async fn fetch_concepts(&self) -> Result<Vec<Concept>, FetchError>;

    /// Removes the body-site concepts
    async fn delete_body_sites(&self) -> Result<(), FetchError>;

    /// Pushes a concept set
    async fn push_concepts(&self, concepts: &[Concept]) -> Result<(), FetchError>;

    /// Base URL used for logging
    fn endpoint(&self) -> &str;
}
