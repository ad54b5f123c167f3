//! Core reconciliation engine.
//!
//! # Modules
//!
//! - [`normalize`] - CSV rows to canonical records
//! - [`valueset`] - canonical records to value sets
//! - [`publish`] - paced publication to the terminology server
//! - [`snapshot`] - Bahmni concept snapshots
//! - [`diff`] - before/after comparison
//! - [`sync`] - mode selection and sequencing
//!
//! # Publish Workflow
//!
//! 1. **Before snapshot** of Bahmni's procedure-order concepts
//! 2. **Delete** Bahmni's body-site concepts
//! 3. **Convert** every CSV source into value sets and write them out
//! 4. **Publish** each member, one request per delay slot
//! 5. **Save status** to a timestamped file
//! 6. **After snapshot** and diff
//!
//! # Example
//!
//! ```rust
//! use procedures_sync::core::normalize::normalize;
//! use procedures_sync::core::valueset::build_value_sets;
//! use procedures_sync::domain::RawRow;
//!
//! let rows = vec![
//!     RawRow::new()
//!         .with_field("Category", "Body Site")
//!         .with_field("Code", "61685007")
//!         .with_field("Display", "Lower limb structure"),
//! ];
//! let records = normalize(rows).filter_map(Result::ok);
//! let value_sets = build_value_sets(records);
//! assert_eq!(value_sets[0].name, "Body Site");
//! ```

pub mod diff;
pub mod normalize;
pub mod publish;
pub mod snapshot;
pub mod sync;
pub mod valueset;
