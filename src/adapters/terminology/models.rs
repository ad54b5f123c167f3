//! FHIR ValueSet wire shapes
//!
//! Only the parts of the FHIR `ValueSet` and `Bundle` resources the terminology
//! server needs (or returns) for body-site/procedure value sets are modelled.

use crate::domain::{Member, ValueSet, ValueSetId};
use serde::{Deserialize, Serialize};

/// Code system of the body-site and procedure codes
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// FHIR `ValueSet` resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetResource {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose: Option<Compose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion: Option<Expansion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compose {
    #[serde(default)]
    pub include: Vec<ComposeInclude>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeInclude {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default)]
    pub concept: Vec<ConceptReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptReference {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    #[serde(default)]
    pub contains: Vec<ExpansionContains>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionContains {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// FHIR search result `Bundle`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BundleEntry {
    pub resource: Option<serde_json::Value>,
}

fn default_status() -> String {
    "active".to_string()
}

impl ValueSetResource {
    /// Full resource with every member in `compose`
    pub fn from_value_set(value_set: &ValueSet, canonical_base: &str) -> Self {
        Self::with_members(value_set, canonical_base, &value_set.members)
    }

    /// Resource carrying the value set context and exactly one member
    ///
    /// This is the body of each per-member creation request.
    pub fn for_member(value_set: &ValueSet, member: &Member, canonical_base: &str) -> Self {
        Self::with_members(value_set, canonical_base, std::slice::from_ref(member))
    }

    fn with_members(value_set: &ValueSet, canonical_base: &str, members: &[Member]) -> Self {
        let concept = members
            .iter()
            .map(|m| ConceptReference {
                code: m.code.clone(),
                display: Some(m.display.clone()),
            })
            .collect();

        Self {
            resource_type: "ValueSet".to_string(),
            id: Some(value_set.identifier.as_str().to_string()),
            url: Some(value_set.canonical_url(canonical_base)),
            name: Some(value_set.name.clone()),
            title: Some(value_set.name.clone()),
            status: default_status(),
            compose: Some(Compose {
                include: vec![ComposeInclude {
                    system: Some(SNOMED_SYSTEM.to_string()),
                    concept,
                }],
            }),
            expansion: None,
        }
    }

    /// Converts back into the domain model
    ///
    /// Members come from `compose.include[*].concept`, falling back to
    /// `expansion.contains` when the server only returns an expansion. A
    /// missing display falls back to the code. Returns `None` for resources
    /// with neither a name, title nor id.
    pub fn to_value_set(&self) -> Option<ValueSet> {
        let name = self
            .name
            .clone()
            .or_else(|| self.title.clone())
            .or_else(|| self.id.clone())?;

        let mut members: Vec<Member> = self
            .compose
            .iter()
            .flat_map(|c| c.include.iter())
            .flat_map(|inc| inc.concept.iter())
            .map(|c| Member::new(&c.code, c.display.as_deref().unwrap_or(&c.code)))
            .collect();

        if members.is_empty() {
            members = self
                .expansion
                .iter()
                .flat_map(|e| e.contains.iter())
                .map(|c| Member::new(&c.code, c.display.as_deref().unwrap_or(&c.code)))
                .collect();
        }

        let identifier = match &self.id {
            Some(id) => ValueSetId::from_existing(id.clone()),
            None => ValueSetId::from_name(&name),
        };

        Some(ValueSet {
            name,
            identifier,
            members,
        })
    }
}

/// Extracts value sets from a terminology server response body
///
/// Accepts either a search `Bundle` or a single `ValueSet`. Entries of other
/// resource types are skipped.
pub fn value_sets_from_json(body: &serde_json::Value) -> Result<Vec<ValueSet>, String> {
    match body.get("resourceType").and_then(|v| v.as_str()) {
        Some("Bundle") => {
            let bundle: Bundle =
                serde_json::from_value(body.clone()).map_err(|e| format!("invalid Bundle: {e}"))?;
            let mut value_sets = Vec::new();
            for resource in bundle.entry.into_iter().filter_map(|e| e.resource) {
                if resource.get("resourceType").and_then(|v| v.as_str()) != Some("ValueSet") {
                    continue;
                }
                let parsed: ValueSetResource = serde_json::from_value(resource)
                    .map_err(|e| format!("invalid ValueSet entry: {e}"))?;
                value_sets.extend(parsed.to_value_set());
            }
            Ok(value_sets)
        }
        Some("ValueSet") => {
            let parsed: ValueSetResource = serde_json::from_value(body.clone())
                .map_err(|e| format!("invalid ValueSet: {e}"))?;
            Ok(parsed.to_value_set().into_iter().collect())
        }
        Some(other) => Err(format!("unexpected resourceType '{other}'")),
        None => Err("response has no resourceType".to_string()),
    }
}
