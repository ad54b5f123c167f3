//! External system integrations.
//!
//! - [`terminology`] - FHIR terminology server (value set store)
//! - [`clinical`] - Bahmni clinical-records server
//! - [`source`] - CSV source files
//! - [`status`] - output directory and status files
//!
//! The two remote servers sit behind traits so the engine can be exercised
//! with in-memory doubles.

pub mod clinical;
pub mod source;
pub mod status;
pub mod terminology;
