//! Bounded-concurrency broadcast dispatch

use std::sync::Arc;
use std::time::Duration;
use futures::stream::{self, StreamExt};
use tracing::{error, info};
use crate::config::BroadcastConfig;
use crate::models::{BroadcastPayload, GroupRecord};
use crate::services::ports::GroupRegistry;
use crate::utils::helpers::exponential_backoff;
use crate::utils::logging::{log_delivery_outcome, log_group_event};
use super::report::{BroadcastJob, TargetResult};
use super::transport::{DeliveryOutcome, DeliveryTransport};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Deliveries in flight at once
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub failure_sample_size: usize,
}

impl From<&BroadcastConfig> for DispatchSettings {
    fn from(config: &BroadcastConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay(),
            failure_sample_size: config.failure_sample_size,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&BroadcastConfig::default())
    }
}

/// Split the active set into targets and the count left over by the group cap
pub fn select_targets(groups: &[GroupRecord], max_groups: usize) -> (Vec<i64>, u32) {
    let targets: Vec<i64> = groups.iter().take(max_groups).map(|g| g.chat_id).collect();
    let skipped = u32::try_from(groups.len() - targets.len()).unwrap_or(u32::MAX);
    (targets, skipped)
}

/// Result of probing the active set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCheckSummary {
    pub valid: u32,
    pub migrated: u32,
    pub deactivated: u32,
    pub failed: u32,
}

impl GroupCheckSummary {
    pub fn summary_text(&self) -> String {
        format!(
            "🔍 Group check finished\n✅ Valid: {}\n🔀 Migrated: {}\n🚫 Deactivated: {}\n❌ Unreachable: {}",
            self.valid, self.migrated, self.deactivated, self.failed
        )
    }
}

#[derive(Clone, Copy)]
enum Operation<'a> {
    Deliver(&'a BroadcastPayload),
    Probe,
}

pub struct BroadcastDispatcher {
    transport: Arc<dyn DeliveryTransport>,
    registry: Arc<dyn GroupRegistry>,
    settings: DispatchSettings,
}

impl BroadcastDispatcher {
    pub fn new(
        transport: Arc<dyn DeliveryTransport>,
        registry: Arc<dyn GroupRegistry>,
        settings: DispatchSettings,
    ) -> Self {
        Self { transport, registry, settings }
    }

    /// Deliver `payload` to every target. Returns once all targets are terminal.
    pub async fn dispatch(&self, actor_id: i64, payload: &BroadcastPayload, targets: Vec<i64>, skipped: u32) -> BroadcastJob {
        let target_count = u32::try_from(targets.len()).unwrap_or(u32::MAX);
        let mut job = BroadcastJob::new(
            actor_id,
            payload.clone(),
            target_count,
            skipped,
            self.settings.failure_sample_size,
        );

        info!(job_id = %job.job_id, actor_id, targets = target_count, skipped, "Broadcast dispatch started");

        let mut results = stream::iter(targets)
            .map(|chat_id| self.run_target(chat_id, Operation::Deliver(payload)))
            .buffer_unordered(self.settings.concurrency.max(1));

        while let Some(result) = results.next().await {
            job.record(&result);
        }

        job
    }

    /// Probe each chat, migrating or deactivating exactly as a delivery would
    pub async fn check_groups(&self, chat_ids: Vec<i64>) -> GroupCheckSummary {
        let mut summary = GroupCheckSummary::default();
        let mut results = stream::iter(chat_ids)
            .map(|chat_id| self.run_target(chat_id, Operation::Probe))
            .buffer_unordered(self.settings.concurrency.max(1));

        while let Some(result) = results.next().await {
            if result.migrated_from.is_some() {
                summary.migrated += 1;
            }
            if result.deactivated {
                summary.deactivated += 1;
            } else if result.is_success() {
                summary.valid += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    async fn attempt(&self, chat_id: i64, operation: Operation<'_>) -> DeliveryOutcome {
        match operation {
            Operation::Deliver(payload) => self.transport.deliver(chat_id, payload).await,
            Operation::Probe => self.transport.probe(chat_id).await,
        }
    }

    /// Drive one target to a terminal result
    async fn run_target(&self, chat_id: i64, operation: Operation<'_>) -> TargetResult {
        let mut target = chat_id;
        let mut migrated_from = None;
        let mut retries = 0u32;

        let result = loop {
            let outcome = self.attempt(target, operation).await;
            match outcome {
                DeliveryOutcome::Delivered => {
                    break TargetResult::succeeded(target);
                }
                DeliveryOutcome::Transient { reason, retry_after } => {
                    if retries >= self.settings.max_retries {
                        break TargetResult::failed(target, reason);
                    }
                    retries += 1;
                    let backoff = exponential_backoff(self.settings.retry_base_delay, retries);
                    tokio::time::sleep(retry_after.map_or(backoff, |hint| hint.max(backoff))).await;
                }
                DeliveryOutcome::Migrated(new_chat_id) => {
                    if migrated_from.is_some() || new_chat_id == target {
                        break TargetResult::failed(target, format!("migrated again to {}", new_chat_id));
                    }
                    // The record must follow the chat before anything is sent to the new id
                    if let Err(e) = self.registry.migrate(target, new_chat_id).await {
                        error!(old_chat_id = target, new_chat_id, error = %e, "Failed to migrate group record");
                        break TargetResult::failed(target, format!("migration to {} failed: {}", new_chat_id, e));
                    }
                    log_group_event(new_chat_id, "migrated", Some(&target.to_string()));
                    migrated_from = Some(target);
                    target = new_chat_id;
                }
                DeliveryOutcome::Permanent(reason) => {
                    let deactivated = match self.registry.deactivate(target, &reason).await {
                        Ok(()) => {
                            log_group_event(target, "deactivated", Some(&reason));
                            true
                        }
                        Err(e) => {
                            error!(chat_id = target, error = %e, "Failed to deactivate group");
                            false
                        }
                    };
                    break TargetResult { deactivated, ..TargetResult::failed(target, reason) };
                }
                DeliveryOutcome::Rejected(reason) => {
                    break TargetResult::failed(target, reason);
                }
            }
        };

        let outcome = if result.is_success() { "delivered" } else { "failed" };
        log_delivery_outcome(result.chat_id, outcome, retries + 1, result.failure.as_deref());

        TargetResult { migrated_from, ..result }
    }
}
