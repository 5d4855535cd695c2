//! Group registry and statistics command handlers

use teloxide::{Bot, types::Message, prelude::*};
use tracing::info;
use crate::models::{ActorRole, LanguageMode};
use crate::services::ServiceFactory;
use crate::utils::errors::{RelayError, Result};
use crate::utils::helpers::format_timestamp;
use crate::utils::logging::log_admin_action;
use super::admin::authorize_sender;

/// Handle /list_groups
pub async fn handle_list_groups(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if authorize_sender(&bot, &msg, &services, ActorRole::Broadcaster).await?.is_none() {
        return Ok(());
    }

    let groups = services.database.groups.get_active_groups().await?;
    if groups.is_empty() {
        bot.send_message(msg.chat.id, "No active groups").await?;
        return Ok(());
    }

    let mut lines = vec![format!("Active groups ({}):", groups.len())];
    lines.extend(groups.iter().map(|g| {
        format!("• {} ({}) [{}] since {}", g.title, g.chat_id, g.language_mode, format_timestamp(g.activated_at))
    }));

    // Stay under the message size limit on large registries
    for chunk in lines.chunks(50) {
        bot.send_message(msg.chat.id, chunk.join("\n")).await?;
    }
    Ok(())
}

/// Handle /remove_group
pub async fn handle_remove_group(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, ActorRole::Controller).await? else {
        return Ok(());
    };

    let Ok(chat_id) = arg.trim().parse::<i64>() else {
        bot.send_message(msg.chat.id, "Usage: /remove_group <chat_id>").await?;
        return Ok(());
    };

    let removed = services.database.groups.remove(chat_id).await?;
    log_admin_action(admin_id, "remove_group", Some(&chat_id.to_string()), None);

    let text = if removed { "✅ Removed" } else { "ℹ️ No such group" };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Split `<chat_id> <value>` arguments of the per-group setting commands
fn parse_group_setting(arg: &str) -> Option<(i64, &str)> {
    let mut parts = arg.split_whitespace();
    let chat_id = parts.next()?.parse().ok()?;
    let value = parts.next()?;
    parts.next().is_none().then_some((chat_id, value))
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// Handle /set_mode
pub async fn handle_set_mode(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, ActorRole::Controller).await? else {
        return Ok(());
    };

    let parsed = parse_group_setting(&arg).and_then(|(chat_id, value)| Some((chat_id, value.parse::<LanguageMode>().ok()?)));
    let Some((chat_id, mode)) = parsed else {
        bot.send_message(msg.chat.id, "Usage: /set_mode <chat_id> <auto|en|zh>").await?;
        return Ok(());
    };

    let text = match services.database.groups.set_language_mode(chat_id, mode).await {
        Ok(()) => {
            log_admin_action(admin_id, "set_mode", Some(&chat_id.to_string()), Some(mode.as_str()));
            format!("✅ Translation mode of {} set to {}", chat_id, mode)
        }
        Err(RelayError::GroupNotFound { .. }) => "ℹ️ No such group".to_string(),
        Err(e) => return Err(e),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /translation
pub async fn handle_translation(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, ActorRole::Controller).await? else {
        return Ok(());
    };

    let parsed = parse_group_setting(&arg).and_then(|(chat_id, value)| Some((chat_id, parse_switch(value)?)));
    let Some((chat_id, enabled)) = parsed else {
        bot.send_message(msg.chat.id, "Usage: /translation <chat_id> <on|off>").await?;
        return Ok(());
    };

    let text = match services.database.groups.set_translation_enabled(chat_id, enabled).await {
        Ok(()) => {
            let state = if enabled { "on" } else { "off" };
            log_admin_action(admin_id, "translation", Some(&chat_id.to_string()), Some(state));
            format!("✅ Translation in {} turned {}", chat_id, state)
        }
        Err(RelayError::GroupNotFound { .. }) => "ℹ️ No such group".to_string(),
        Err(e) => return Err(e),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /check_groups
pub async fn handle_check_groups(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, ActorRole::Controller).await? else {
        return Ok(());
    };

    bot.send_message(msg.chat.id, "🔍 Checking groups, this may take a while...").await?;
    let summary = services.relay.check_groups(admin_id).await?;
    info!(admin_id, ?summary, "Group check finished");

    bot.send_message(msg.chat.id, summary.summary_text()).await?;
    Ok(())
}

/// Handle /stats
pub async fn handle_stats(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if authorize_sender(&bot, &msg, &services, ActorRole::Controller).await?.is_none() {
        return Ok(());
    }

    let stats = services.database.get_stats().await?;
    let notifications = services.notification_service.stats();
    let text = format!(
        "{}\nOwner notices: {} sent, {} failed",
        stats.summary_text(),
        notifications.total_sent,
        notifications.total_failed
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Split `/preview` arguments into chat id and text
fn parse_preview_args(arg: &str) -> Option<(i64, &str)> {
    let (chat_id, text) = arg.trim().split_once(char::is_whitespace)?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some((chat_id.parse().ok()?, text))
}

/// Handle /preview - send a text message to one chat
pub async fn handle_preview(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, ActorRole::Controller).await? else {
        return Ok(());
    };

    let Some((chat_id, text)) = parse_preview_args(&arg) else {
        bot.send_message(msg.chat.id, "Usage: /preview <chat_id> <text>").await?;
        return Ok(());
    };

    let reply = match services.notification_service.send_text(chat_id, text).await {
        Ok(()) => {
            log_admin_action(admin_id, "preview", Some(&chat_id.to_string()), None);
            "✅ Sent".to_string()
        }
        Err(e) => format!("❌ Failed: {}", e),
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
