//! Broadcast models

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Kind of message being relayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Photo,
    Video,
    Document,
    Sticker,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Photo => "photo",
            ContentType::Video => "video",
            ContentType::Document => "document",
            ContentType::Sticker => "sticker",
            ContentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => ContentType::Text,
            "photo" => ContentType::Photo,
            "video" => ContentType::Video,
            "document" => ContentType::Document,
            "sticker" => ContentType::Sticker,
            _ => ContentType::Unknown,
        })
    }
}

/// Reference to the message being broadcast.
///
/// Deliveries copy the source message server-side, so the payload never carries
/// media bytes and is cheap to share between concurrent deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPayload {
    pub content_type: ContentType,
    pub source_chat_id: i64,
    pub message_id: i32,
}

impl BroadcastPayload {
    pub fn new(content_type: ContentType, source_chat_id: i64, message_id: i32) -> Self {
        Self { content_type, source_chat_id, message_id }
    }
}

/// Immutable summary of one finished broadcast job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReport {
    /// Audit store row id
    pub id: i64,
    pub job_id: Uuid,
    pub actor_id: i64,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub total: u32,
    pub success: u32,
    pub failure: u32,
    /// Active groups left out because of the per-broadcast group cap
    pub skipped: u32,
    pub failure_samples: Vec<String>,
}

impl BroadcastReport {
    /// Text sent back to the initiating actor
    pub fn summary_text(&self) -> String {
        let mut text = format!(
            "📢 Broadcast finished\nTotal: {}\n✅ Success: {}\n❌ Failure: {}",
            self.total, self.success, self.failure
        );
        if self.skipped > 0 {
            text.push_str(&format!("\n⏭ Skipped (group cap): {}", self.skipped));
        }
        if !self.failure_samples.is_empty() {
            text.push_str("\n\n⚠️ Failure samples:\n");
            text.push_str(&self.failure_samples.join("\n"));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(samples: Vec<String>, skipped: u32) -> BroadcastReport {
        BroadcastReport {
            id: 1,
            job_id: Uuid::new_v4(),
            actor_id: 42,
            content_type: ContentType::Text,
            created_at: Utc::now(),
            total: 3,
            success: 2,
            failure: 1,
            skipped,
            failure_samples: samples,
        }
    }

    #[test]
    fn test_content_type_round_trip_through_text() {
        assert_eq!("photo".parse::<ContentType>().unwrap(), ContentType::Photo);
        assert_eq!("voice".parse::<ContentType>().unwrap(), ContentType::Unknown);
    }

    #[test]
    fn test_summary_text() {
        let text = report(vec!["Forbidden: bot was kicked".to_string()], 0).summary_text();
        assert!(text.contains("Total: 3"));
        assert!(text.contains("Success: 2"));
        assert!(text.contains("Forbidden: bot was kicked"));
        assert!(!text.contains("Skipped"));

        let text = report(vec![], 4).summary_text();
        assert!(text.contains("Skipped (group cap): 4"));
        assert!(!text.contains("Failure samples"));
    }
}
