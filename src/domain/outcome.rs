//! Publish outcomes
//!
//! One [`PublishOutcome`] is produced per value set the publisher attempted.
//! Outcomes are immutable once built and are what the status file persists.

use super::errors::PublishError;
use super::valueset::ValueSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success or failure of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishStatus {
    Succeeded,
    Failed { reason: String },
}

impl PublishStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Result of creating a single member on the terminology server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOutcome {
    pub code: String,
    #[serde(flatten)]
    pub status: PublishStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl MemberOutcome {
    pub fn succeeded(code: impl Into<String>, http_status: u16) -> Self {
        Self {
            code: code.into(),
            status: PublishStatus::Succeeded,
            http_status: Some(http_status),
        }
    }

    pub fn failed(error: &PublishError) -> Self {
        Self {
            code: error.code.clone(),
            status: PublishStatus::Failed {
                reason: error.cause.clone(),
            },
            http_status: error.http_status,
        }
    }
}

/// Aggregated publish result for one value set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub value_set: ValueSet,
    #[serde(flatten)]
    pub status: PublishStatus,
    pub members: Vec<MemberOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl PublishOutcome {
    /// Builds the outcome from member results
    ///
    /// The value set succeeded only if every member did. A failed outcome
    /// names the failing codes in its reason.
    pub fn from_members(value_set: ValueSet, members: Vec<MemberOutcome>) -> Self {
        let failed: Vec<&str> = members
            .iter()
            .filter(|m| !m.status.is_success())
            .map(|m| m.code.as_str())
            .collect();

        let status = if failed.is_empty() {
            PublishStatus::Succeeded
        } else {
            PublishStatus::Failed {
                reason: format!(
                    "{} of {} members failed: {}",
                    failed.len(),
                    members.len(),
                    failed.join(", ")
                ),
            }
        };

        Self {
            value_set,
            status,
            members,
            timestamp: Utc::now(),
        }
    }

    /// Codes that were created successfully, in publish order
    pub fn succeeded_codes(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.status.is_success())
            .map(|m| m.code.as_str())
    }

    pub fn succeeded_count(&self) -> usize {
        self.members.iter().filter(|m| m.status.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.members.len() - self.succeeded_count()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
