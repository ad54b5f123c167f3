//! Clinical-records concept references and snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which vocabulary a concept belongs to on the clinical-records server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConceptSource {
    Procedure,
    BodySite,
}

impl ConceptSource {
    /// Infers the source for concepts taken from a value set
    ///
    /// Value sets whose name mentions "body site" hold body sites; anything
    /// else is treated as a procedure vocabulary.
    pub fn for_value_set_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if normalized.contains("bodysite") {
            Self::BodySite
        } else {
            Self::Procedure
        }
    }
}

impl fmt::Display for ConceptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procedure => write!(f, "procedure"),
            Self::BodySite => write!(f, "bodySite"),
        }
    }
}

/// A concept referenced by procedure orders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub display: String,
    pub source: ConceptSource,
}

impl Concept {
    pub fn new(code: impl Into<String>, display: impl Into<String>, source: ConceptSource) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            source,
        }
    }
}

/// The set of concepts known to the clinical-records server at one instant
///
/// Keyed by code; iteration is in code order. When the same code is inserted
/// twice the first entry is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptSnapshot {
    concepts: BTreeMap<String, Concept>,
    taken_at: DateTime<Utc>,
}

impl ConceptSnapshot {
    /// Creates an empty snapshot stamped with the current time
    pub fn new() -> Self {
        Self {
            concepts: BTreeMap::new(),
            taken_at: Utc::now(),
        }
    }

    /// Builds a snapshot from concepts, keeping the first entry per code
    pub fn from_concepts(concepts: impl IntoIterator<Item = Concept>) -> Self {
        let mut snapshot = Self::new();
        for concept in concepts {
            snapshot.insert(concept);
        }
        snapshot
    }

    /// Inserts a concept unless its code is already present
    ///
    /// Returns `true` when the concept was added.
    pub fn insert(&mut self, concept: Concept) -> bool {
        if self.concepts.contains_key(&concept.code) {
            return false;
        }
        self.concepts.insert(concept.code.clone(), concept);
        true
    }

    pub fn get(&self, code: &str) -> Option<&Concept> {
        self.concepts.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.concepts.contains_key(code)
    }

    /// Concepts in code order
    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// Concepts from one source, in code order
    pub fn by_source(&self, source: ConceptSource) -> impl Iterator<Item = &Concept> {
        self.concepts.values().filter(move |c| c.source == source)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

impl Default for ConceptSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
