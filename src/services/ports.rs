//! Narrow interfaces the relay core talks through.
//!
//! The broadcast dispatcher and the translator chain never reach for the
//! database or the Bot API directly; they go through these traits so the
//! core can be driven by in-memory fakes in tests.

use async_trait::async_trait;
use crate::models::{BroadcastReport, GroupRecord};
use crate::utils::errors::Result;

/// Durable chat identity → activation state mapping
#[async_trait]
pub trait GroupRegistry: Send + Sync {
    /// Active groups in stable registry order (activation time, then id)
    async fn list_active(&self) -> Result<Vec<GroupRecord>>;

    /// Repoint the record at `old_chat_id` to `new_chat_id`.
    ///
    /// Must be idempotent: repeating the call, or calling it after the new
    /// identity already exists, leaves exactly one record at `new_chat_id`.
    async fn migrate(&self, old_chat_id: i64, new_chat_id: i64) -> Result<()>;

    /// Mark a group inactive. Last writer wins.
    async fn deactivate(&self, chat_id: i64, reason: &str) -> Result<()>;
}

/// Append-only store for finished broadcast reports
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a report and return its row id
    async fn record_broadcast(&self, report: &BroadcastReport) -> Result<i64>;
}

/// Side channel to the Owner for operational notices that must never
/// surface inside a group
#[async_trait]
pub trait OwnerNotifier: Send + Sync {
    async fn notify_owner(&self, text: &str);
}
