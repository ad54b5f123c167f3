//! Source rows and their canonical form

use serde::{Deserialize, Serialize};

/// One raw tabular row as handed over by a file source
///
/// Fields keep their source order and are addressed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from parallel header and value slices
    ///
    /// Values beyond the header count are dropped; missing values are simply
    /// absent, so a short row reports a missing column on lookup.
    pub fn from_parts<H, V>(headers: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        Self { fields }
    }

    /// Appends a field
    pub fn with_field(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((header.into(), value.into()));
        self
    }

    /// Looks up a field by header, ignoring case and surrounding whitespace
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h.trim().eq_ignore_ascii_case(header))
            .map(|(_, v)| v.as_str())
    }

    /// Header names in source order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A source row after normalization
///
/// All fields are trimmed. `code` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Grouping key; one value set is built per category
    pub category: String,

    /// Concept code
    pub code: String,

    /// Human readable name of the concept
    pub display_name: String,

    /// Optional parent grouping (empty when the source has none)
    pub parent_grouping: String,
}

impl CanonicalRecord {
    /// Creates a canonical record, trimming every field
    pub fn new(
        category: impl AsRef<str>,
        code: impl AsRef<str>,
        display_name: impl AsRef<str>,
        parent_grouping: impl AsRef<str>,
    ) -> Self {
        Self {
            category: category.as_ref().trim().to_string(),
            code: code.as_ref().trim().to_string(),
            display_name: display_name.as_ref().trim().to_string(),
            parent_grouping: parent_grouping.as_ref().trim().to_string(),
        }
    }
}
