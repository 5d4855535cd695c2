//! Message handlers module
//!
//! Group messages go through the translator chain; private messages from
//! broadcasters are relayed to every active group.

use teloxide::{Bot, types::{Message, ReplyParameters}, prelude::*};
use tracing::{debug, info, warn};
use crate::models::{BroadcastPayload, ContentType, CreateTranslationLogRequest};
use crate::services::{GroupReply, GroupTranslation, ServiceFactory};
use crate::utils::errors::{RelayError, Result};
use crate::utils::logging::log_api_error;

/// Handle incoming messages
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if msg.chat.is_private() {
        handle_private_message(bot, msg, services).await
    } else if msg.chat.is_group() || msg.chat.is_supergroup() {
        handle_group_message(bot, msg, services).await
    } else {
        Ok(())
    }
}

/// Kind of content carried by a message
pub fn content_type_of(msg: &Message) -> ContentType {
    if msg.text().is_some() {
        ContentType::Text
    } else if msg.photo().is_some() {
        ContentType::Photo
    } else if msg.video().is_some() {
        ContentType::Video
    } else if msg.document().is_some() {
        ContentType::Document
    } else if msg.sticker().is_some() {
        ContentType::Sticker
    } else {
        ContentType::Unknown
    }
}

async fn handle_group_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id.0;

    if let Some(new_chat_id) = msg.migrate_to_chat_id() {
        info!(chat_id, new_chat_id = new_chat_id.0, "Group upgraded to supergroup");
        services.database.groups.migrate(chat_id, new_chat_id.0).await?;
        return Ok(());
    }

    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }
    let Some(text) = msg.text().or_else(|| msg.caption()) else {
        return Ok(());
    };
    let Some(group) = services.database.groups.find_by_chat_id(chat_id).await? else {
        return Ok(());
    };

    let translation = match services.relay.handle_group_message(&group, text).await {
        GroupReply::Translated(translation) => translation,
        GroupReply::Skip => {
            debug!(chat_id, message_id = msg.id.0, "Nothing to translate");
            return Ok(());
        }
    };

    let sent = send_translation(&bot, &msg, &translation).await;
    if sent {
        info!(
            chat_id,
            message_id = msg.id.0,
            source = ?translation.translation.source,
            target = %translation.translation.target,
            provider = translation.translation.provider,
            "Message translated"
        );
    }

    let log = CreateTranslationLogRequest {
        chat_id,
        message_id: i64::from(msg.id.0),
        user_id: Some(user.id.0 as i64),
        source_lang: translation.translation.source,
        target_lang: translation.translation.target,
        provider: translation.translation.provider.to_string(),
        success: sent,
    };
    if let Err(e) = services.database.translation_logs.create(log).await {
        warn!(chat_id, error = %e, "Failed to record translation log");
    }
    Ok(())
}

/// Post the translation as a reply; falls back to a plain message when the original is gone
async fn send_translation(bot: &Bot, msg: &Message, translation: &GroupTranslation) -> bool {
    let reply = bot
        .send_message(msg.chat.id, translation.reply_text.clone())
        .reply_parameters(ReplyParameters::new(msg.id).allow_sending_without_reply())
        .await;

    match reply {
        Ok(_) => true,
        Err(e) => {
            log_api_error("sendMessage", &e.to_string(), Some("translation reply"));
            false
        }
    }
}

async fn handle_private_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    // Unknown commands are not broadcast
    if msg.text().is_some_and(|text| text.trim_start().starts_with('/')) {
        return Ok(());
    }

    let payload = BroadcastPayload::new(content_type_of(&msg), msg.chat.id.0, msg.id.0);
    let reply = match services.relay.handle_broadcast_request(user_id, payload).await {
        Ok(report) if report.total == 0 => "No active groups".to_string(),
        Ok(report) => report.summary_text(),
        Err(RelayError::PermissionDenied(_)) => "⛔ Permission denied".to_string(),
        Err(RelayError::RateLimited { .. }) => {
            let status = services.relay.rate_limit_status(user_id);
            format!(
                "⏳ Broadcast limit reached. Try again in {} min.",
                status.resets_in.as_secs().div_ceil(60)
            )
        }
        Err(e) => return Err(e),
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
