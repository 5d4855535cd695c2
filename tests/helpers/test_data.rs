//! Test data helpers

use chrono::{Duration, Utc};
use LinguaRelay::models::{ActivateGroupRequest, BroadcastPayload, ContentType, GroupRecord, LanguageMode};

pub const OWNER_ID: i64 = 1000;
pub const CONTROLLER_ID: i64 = 2000;
pub const BROADCASTER_ID: i64 = 3000;
pub const STRANGER_ID: i64 = 4000;

/// An active auto-mode group; `order` spaces activation times apart
pub fn active_group(chat_id: i64, order: i64) -> GroupRecord {
    let activated_at = Utc::now() - Duration::minutes(1000 - order);
    GroupRecord {
        chat_id,
        title: format!("group {}", chat_id),
        activated_by: OWNER_ID,
        activated_at,
        language_mode: LanguageMode::Auto,
        active: true,
        translation_enabled: true,
        deactivated_reason: None,
        updated_at: activated_at,
    }
}

pub fn activation(chat_id: i64) -> ActivateGroupRequest {
    ActivateGroupRequest {
        chat_id,
        title: format!("group {}", chat_id),
        activated_by: OWNER_ID,
        language_mode: None,
    }
}

pub fn text_payload(actor_id: i64) -> BroadcastPayload {
    BroadcastPayload::new(ContentType::Text, actor_id, 42)
}
