//! Delivery transport and outcome classification

use std::time::Duration;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::RequestError;
use crate::models::BroadcastPayload;
use crate::utils::helpers::extract_migrated_chat_id;

/// Terminal or retryable result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Worth retrying: network trouble or flood control
    Transient {
        reason: String,
        retry_after: Option<Duration>,
    },
    /// The bot can no longer post to this chat
    Permanent(String),
    /// The chat was upgraded to a supergroup with a new id
    Migrated(i64),
    /// Refused for a reason unrelated to the chat itself
    Rejected(String),
}

impl DeliveryOutcome {
    pub fn transient(reason: impl Into<String>) -> Self {
        DeliveryOutcome::Transient { reason: reason.into(), retry_after: None }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Transient { .. } => "transient",
            DeliveryOutcome::Permanent(_) => "permanent",
            DeliveryOutcome::Migrated(_) => "migrated",
            DeliveryOutcome::Rejected(_) => "rejected",
        }
    }

    /// Failure reason, `None` for success and migration
    pub fn reason(&self) -> Option<&str> {
        match self {
            DeliveryOutcome::Transient { reason, .. }
            | DeliveryOutcome::Permanent(reason)
            | DeliveryOutcome::Rejected(reason) => Some(reason),
            DeliveryOutcome::Delivered | DeliveryOutcome::Migrated(_) => None,
        }
    }
}

/// Sends one payload to one chat
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn deliver(&self, chat_id: i64, payload: &BroadcastPayload) -> DeliveryOutcome;

    /// Check that the chat is still reachable without posting to it
    async fn probe(&self, chat_id: i64) -> DeliveryOutcome;
}

/// Map a Bot API error onto a delivery outcome
pub fn classify_request_error(error: &RequestError) -> DeliveryOutcome {
    match error {
        RequestError::MigrateToChatId(new_chat_id) => DeliveryOutcome::Migrated(new_chat_id.0),
        RequestError::RetryAfter(seconds) => DeliveryOutcome::Transient {
            reason: error.to_string(),
            retry_after: Some(seconds.duration()),
        },
        RequestError::Network(_) | RequestError::Io(_) => DeliveryOutcome::transient(error.to_string()),
        RequestError::Api(api_error) => classify_api_description(&api_error.to_string()),
        _ => DeliveryOutcome::Rejected(error.to_string()),
    }
}

/// Classify the text of an API refusal
pub fn classify_api_description(description: &str) -> DeliveryOutcome {
    let lower = description.to_lowercase();

    if lower.contains("migrated to supergroup") || lower.contains("new chat id") || lower.contains("upgraded to a supergroup") {
        if let Some(new_chat_id) = extract_migrated_chat_id(description) {
            return DeliveryOutcome::Migrated(new_chat_id);
        }
    }

    const PERMANENT: [&str; 4] = ["forbidden", "chat not found", "kicked", "deactivated"];
    if PERMANENT.iter().any(|marker| lower.contains(marker)) {
        return DeliveryOutcome::Permanent(description.to_string());
    }

    const TRANSIENT: [&str; 4] = ["too many requests", "timeout", "timed out", "network"];
    if TRANSIENT.iter().any(|marker| lower.contains(marker)) {
        return DeliveryOutcome::transient(description);
    }

    DeliveryOutcome::Rejected(description.to_string())
}

/// Bot API transport: server-side copy of the source message
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl DeliveryTransport for TelegramTransport {
    async fn deliver(&self, chat_id: i64, payload: &BroadcastPayload) -> DeliveryOutcome {
        let result = self
            .bot
            .copy_message(
                ChatId(chat_id),
                ChatId(payload.source_chat_id),
                MessageId(payload.message_id),
            )
            .await;

        match result {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify_request_error(&e),
        }
    }

    async fn probe(&self, chat_id: i64) -> DeliveryOutcome {
        match self.bot.get_chat(ChatId(chat_id)).await {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify_request_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_permanent_descriptions() {
        for description in [
            "Forbidden: bot was kicked from the group chat",
            "Bad Request: chat not found",
            "Forbidden: the group chat was deleted",
            "Forbidden: user is deactivated",
        ] {
            assert_matches!(classify_api_description(description), DeliveryOutcome::Permanent(_));
        }
    }

    #[test]
    fn test_migration_description() {
        let outcome = classify_api_description(
            "Bad Request: group chat was upgraded to a supergroup chat, new chat id: -1009876543210",
        );
        assert_eq!(outcome, DeliveryOutcome::Migrated(-1009876543210));
    }

    #[test]
    fn test_migration_without_id_is_not_migrated() {
        assert_matches!(
            classify_api_description("Bad Request: group chat was migrated to supergroup"),
            DeliveryOutcome::Rejected(_)
        );
    }

    #[test]
    fn test_other_descriptions() {
        assert_matches!(
            classify_api_description("Too Many Requests: retry after 5"),
            DeliveryOutcome::Transient { retry_after: None, .. }
        );
        assert_matches!(
            classify_api_description("Bad Request: message to copy not found"),
            DeliveryOutcome::Rejected(_)
        );
    }

    #[test]
    fn test_classify_request_error() {
        let migrated = RequestError::MigrateToChatId(ChatId(-1001111));
        assert_eq!(classify_request_error(&migrated), DeliveryOutcome::Migrated(-1001111));
    }

    #[test]
    fn test_outcome_reason() {
        assert_eq!(DeliveryOutcome::Delivered.reason(), None);
        assert_eq!(DeliveryOutcome::Permanent("kicked".into()).reason(), Some("kicked"));
        assert_eq!(DeliveryOutcome::transient("timeout").label(), "transient");
    }
}
