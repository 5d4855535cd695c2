//! Notification service implementation
//!
//! Sends operational notices to the Owner's private chat and plain text
//! messages on behalf of admin commands.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::{debug, warn};
use crate::services::ports::OwnerNotifier;
use crate::utils::errors::Result;

/// Notification statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Notification service backed by the Bot API
#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    owner_id: Option<i64>,
    counters: Arc<Counters>,
}

impl NotificationService {
    pub fn new(bot: Bot, owner_id: Option<i64>) -> Self {
        Self {
            bot,
            owner_id,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Send a plain text message
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        match self.bot.send_message(ChatId(chat_id), text.to_string()).await {
            Ok(_) => {
                self.counters.sent.fetch_add(1, Ordering::Relaxed);
                debug!(chat_id, "Notification sent");
                Ok(())
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                Err(e.into())
            }
        }
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            total_sent: self.counters.sent.load(Ordering::Relaxed),
            total_failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl OwnerNotifier for NotificationService {
    async fn notify_owner(&self, text: &str) {
        let Some(owner_id) = self.owner_id else {
            debug!("No owner configured, notice dropped");
            return;
        };
        if let Err(e) = self.send_text(owner_id, text).await {
            warn!(owner_id, error = %e, "Failed to notify owner");
        }
    }
}
