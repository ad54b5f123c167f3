//! Terminology server trait definition
//!
//! The `TerminologyServer` trait abstracts the FHIR value set store so the
//! publisher and the sync coordinator can be driven against a test double.

use crate::domain::{FetchError, Member, PublishError, ValueSet};
use async_trait::async_trait;

/// Trait for terminology server implementations
///
/// # Example
///
/// ```no_run
/// use procedures_sync::adapters::terminology::{FhirTerminologyClient, TerminologyServer};
/// use procedures_sync::config::TerminologyConfig;
/// use procedures_sync::domain::{Member, ValueSet};
///
/// # async fn example() -> procedures_sync::domain::Result<()> {
/// let client = FhirTerminologyClient::new(TerminologyConfig::default())?;
/// let value_set = ValueSet::new("Body Site", vec![Member::new("61685007", "Lower limb")]);
/// let status = client.create_member(&value_set, &value_set.members[0]).await?;
/// assert!((200..300).contains(&status));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TerminologyServer: Send + Sync {
    /// Creates one member of `value_set` on the server
    ///
    /// Returns the HTTP status of the successful response.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] carrying the member code, and the HTTP
    /// status when a non-2xx response was received.
    async fn create_member(
        &self,
        value_set: &ValueSet,
        member: &Member,
    ) -> Result<u16, PublishError>;

    /// Reads every value set the server currently holds
    async fn fetch_value_sets(&self) -> Result<Vec<ValueSet>, FetchError>;

    /// Endpoint used for logging
    fn endpoint(&self) -> &str;
}
