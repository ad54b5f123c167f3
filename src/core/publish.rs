//! Rate-limited publisher
//!
//! Publishes every member of every value set as its own creation request.
//! Within one value set the requests are issued strictly in member order and
//! one at a time, each preceded by a delay; different value sets are published
//! concurrently and joined. A failed member is recorded and never stops the
//! remaining members or value sets.

use crate::adapters::terminology::TerminologyServer;
use crate::config::{DelayPolicy, PublishConfig};
use crate::domain::{MemberOutcome, PublishOutcome, PublishStatus, ValueSet};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Publishes value sets to a terminology server
pub struct Publisher {
    server: Arc<dyn TerminologyServer>,
    base_delay_ms: u64,
    policy: DelayPolicy,
}

impl Publisher {
    pub fn new(server: Arc<dyn TerminologyServer>, config: &PublishConfig) -> Self {
        Self {
            server,
            base_delay_ms: config.base_delay_ms,
            policy: config.delay_policy,
        }
    }

    /// Delay before the `n`-th (1-indexed) request of a value set
    ///
    /// `Linear` waits `n * base`, so the gap widens as the batch progresses;
    /// `Flat` waits `base` every time.
    pub fn delay_for(&self, n: usize) -> Duration {
        let ms = match self.policy {
            DelayPolicy::Linear => self.base_delay_ms.saturating_mul(n as u64),
            DelayPolicy::Flat => self.base_delay_ms,
        };
        Duration::from_millis(ms)
    }

    /// Publishes all value sets, returning one outcome per value set in input order
    pub async fn publish_all(&self, value_sets: Vec<ValueSet>) -> Vec<PublishOutcome> {
        tracing::info!(
            value_sets = value_sets.len(),
            members = value_sets.iter().map(ValueSet::len).sum::<usize>(),
            endpoint = %self.server.endpoint(),
            policy = %self.policy,
            base_delay_ms = self.base_delay_ms,
            "Publishing value sets"
        );

        join_all(value_sets.into_iter().map(|vs| self.publish_value_set(vs))).await
    }

    /// Publishes the members of one value set in order
    pub async fn publish_value_set(&self, value_set: ValueSet) -> PublishOutcome {
        let mut members = Vec::with_capacity(value_set.len());

        for (index, member) in value_set.members.iter().enumerate() {
            tokio::time::sleep(self.delay_for(index + 1)).await;

            let outcome = match self.server.create_member(&value_set, member).await {
                Ok(status) => MemberOutcome::succeeded(&member.code, status),
                Err(e) => MemberOutcome::failed(&e),
            };
            log_member(&value_set, &outcome);
            members.push(outcome);
        }

        let outcome = PublishOutcome::from_members(value_set, members);
        log_outcome(&outcome);
        outcome
    }
}

fn log_member(value_set: &ValueSet, outcome: &MemberOutcome) {
    match &outcome.status {
        PublishStatus::Succeeded => tracing::info!(
            value_set = %value_set.name,
            code = %outcome.code,
            http_status = outcome.http_status,
            "Member created"
        ),
        PublishStatus::Failed { reason } => tracing::warn!(
            value_set = %value_set.name,
            code = %outcome.code,
            http_status = outcome.http_status,
            reason = %reason,
            "Member creation failed"
        ),
    }
}

fn log_outcome(outcome: &PublishOutcome) {
    if outcome.is_success() {
        tracing::info!(
            value_set = %outcome.value_set.name,
            identifier = %outcome.value_set.identifier,
            members = outcome.members.len(),
            "Value set published"
        );
    } else {
        tracing::warn!(
            value_set = %outcome.value_set.name,
            identifier = %outcome.value_set.identifier,
            succeeded = outcome.succeeded_count(),
            failed = outcome.failed_count(),
            "Value set published with failures"
        );
    }
}
