//! Domain models and types.
//!
//! This module contains the data model shared by every engine component.
//!
//! # Overview
//!
//! - **Source data** ([`RawRow`], [`CanonicalRecord`])
//! - **Value sets** ([`ValueSet`], [`Member`], [`ValueSetId`])
//! - **Clinical concepts** ([`Concept`], [`ConceptSource`], [`ConceptSnapshot`])
//! - **Publish results** ([`PublishOutcome`], [`MemberOutcome`], [`PublishStatus`])
//! - **Error types** ([`SyncError`], [`MalformedRecordError`], [`PublishError`], [`FetchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Stable identifiers
//!
//! Value set identifiers are derived from the name only:
//!
//! ```rust
//! use procedures_sync::domain::{Member, ValueSet};
//!
//! let first = ValueSet::new("Body Site", vec![Member::new("C1", "Arm")]);
//! let again = ValueSet::new("Body Site", vec![]);
//! assert_eq!(first.identifier, again.identifier);
//! ```

pub mod concept;
pub mod errors;
pub mod outcome;
pub mod record;
pub mod result;
pub mod valueset;

pub use concept::{Concept, ConceptSnapshot, ConceptSource};
pub use errors::{FetchError, MalformedRecordError, PublishError, SyncError};
pub use outcome::{MemberOutcome, PublishOutcome, PublishStatus};
pub use record::{CanonicalRecord, RawRow};
pub use result::Result;
pub use valueset::{Member, ValueSet, ValueSetId};
