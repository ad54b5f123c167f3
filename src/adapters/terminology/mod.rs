//! Terminology server adapter
//!
//! FHIR `ValueSet` wire models, the `TerminologyServer` trait and its HTTP
//! implementation.

pub mod client;
pub mod models;
mod r#trait;

pub use client::FhirTerminologyClient;
pub use models::{value_sets_from_json, ValueSetResource, SNOMED_SYSTEM};
pub use r#trait::TerminologyServer;
