//! Broadcast job bookkeeping and report finalization

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::{BroadcastPayload, BroadcastReport};
use crate::services::ports::AuditStore;
use crate::utils::errors::Result;

/// Terminal result of one target after retries and migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    /// Identity the target was last addressed by
    pub chat_id: i64,
    pub migrated_from: Option<i64>,
    pub deactivated: bool,
    pub failure: Option<String>,
}

impl TargetResult {
    pub fn succeeded(chat_id: i64) -> Self {
        Self { chat_id, migrated_from: None, deactivated: false, failure: None }
    }

    pub fn failed(chat_id: i64, reason: impl Into<String>) -> Self {
        Self { chat_id, migrated_from: None, deactivated: false, failure: Some(reason.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Mutable accumulator for one dispatch
#[derive(Debug, Clone)]
pub struct BroadcastJob {
    pub job_id: Uuid,
    pub actor_id: i64,
    pub payload: BroadcastPayload,
    pub created_at: DateTime<Utc>,
    pub target_count: u32,
    pub skipped: u32,
    pub success: u32,
    pub failure: u32,
    pub migrated: u32,
    pub deactivated: u32,
    failure_samples: Vec<String>,
    sample_limit: usize,
}

impl BroadcastJob {
    pub fn new(actor_id: i64, payload: BroadcastPayload, target_count: u32, skipped: u32, sample_limit: usize) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            actor_id,
            payload,
            created_at: Utc::now(),
            target_count,
            skipped,
            success: 0,
            failure: 0,
            migrated: 0,
            deactivated: 0,
            failure_samples: Vec::new(),
            sample_limit,
        }
    }

    /// Fold one terminal target result into the counters
    pub fn record(&mut self, result: &TargetResult) {
        if result.migrated_from.is_some() {
            self.migrated += 1;
        }
        if result.deactivated {
            self.deactivated += 1;
        }
        match &result.failure {
            None => self.success += 1,
            Some(reason) => {
                self.failure += 1;
                self.add_sample(result.chat_id, reason);
            }
        }
    }

    /// Keep up to `sample_limit` samples with distinct reasons
    fn add_sample(&mut self, chat_id: i64, reason: &str) {
        if self.failure_samples.len() >= self.sample_limit {
            return;
        }
        let seen = self
            .failure_samples
            .iter()
            .any(|sample| sample.split_once(": ").map(|(_, r)| r) == Some(reason));
        if !seen {
            self.failure_samples.push(format!("{}: {}", chat_id, reason));
        }
    }

    pub fn failure_samples(&self) -> &[String] {
        &self.failure_samples
    }

    /// Persist the summary and hand it back. Consumes the job.
    pub async fn finalize(self, audit: &dyn AuditStore) -> Result<BroadcastReport> {
        let mut report = self.into_report();
        report.id = audit.record_broadcast(&report).await?;
        Ok(report)
    }

    /// Summary without an audit row; `id` stays 0
    pub fn into_report(self) -> BroadcastReport {
        BroadcastReport {
            id: 0,
            job_id: self.job_id,
            actor_id: self.actor_id,
            content_type: self.payload.content_type,
            created_at: self.created_at,
            total: self.target_count,
            success: self.success,
            failure: self.failure,
            skipped: self.skipped,
            failure_samples: self.failure_samples,
        }
    }
}
