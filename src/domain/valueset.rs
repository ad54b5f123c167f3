//! Value set model
//!
//! A [`ValueSet`] is a named, ordered list of [`Member`]s. Its identifier is a
//! pure function of the name, so re-running a conversion over unchanged source
//! data republishes under exactly the same identifier.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Longest slug kept in front of the hash suffix (FHIR ids allow 64 chars)
const MAX_SLUG_LEN: usize = 55;

/// Stable value set identifier
///
/// Format: `{slug}-{hash8}` where `slug` is the lowercased name with runs of
/// non-alphanumeric characters collapsed to `-`, and `hash8` is the first eight
/// hex digits of the SHA-256 of the untrimmed name. The hash keeps names that
/// slug identically ("Body Site" / "body-site") apart.
///
/// # Examples
///
/// ```
/// use procedures_sync::domain::valueset::ValueSetId;
///
/// let id = ValueSetId::from_name("Body Site");
/// assert!(id.as_str().starts_with("body-site-"));
/// assert_eq!(id, ValueSetId::from_name("Body Site"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSetId(String);

impl ValueSetId {
    /// Derives the identifier for a value set name
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        slug.truncate(MAX_SLUG_LEN);
        let slug = slug.trim_end_matches('-');

        let digest = Sha256::digest(name.as_bytes());
        let hash = format!("{digest:x}");
        let hash = &hash[..8];

        if slug.is_empty() {
            Self(format!("valueset-{hash}"))
        } else {
            Self(format!("{slug}-{hash}"))
        }
    }

    /// Wraps an identifier that already exists on a server
    pub fn from_existing(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ValueSetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single code/display pair inside a value set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub code: String,
    pub display: String,
}

impl Member {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
        }
    }
}

/// Named, ordered collection of members
///
/// Member order is the source order; consumers may use position as display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub name: String,
    pub identifier: ValueSetId,
    pub members: Vec<Member>,
}

impl ValueSet {
    /// Creates a value set, deriving its identifier from `name`
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        let name = name.into();
        let identifier = ValueSetId::from_name(&name);
        Self {
            name,
            identifier,
            members,
        }
    }

    /// Canonical URL of this value set under `canonical_base`
    pub fn canonical_url(&self, canonical_base: &str) -> String {
        format!(
            "{}/{}",
            canonical_base.trim_end_matches('/'),
            self.identifier.as_str()
        )
    }

    /// Member codes in order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
