//! Clinical-records server adapter (Bahmni)

pub mod client;
pub mod models;
mod r#trait;

pub use client::BahmniClient;
pub use models::{ConceptListResponse, PushConceptsRequest};
pub use r#trait::ClinicalRecordsServer;
