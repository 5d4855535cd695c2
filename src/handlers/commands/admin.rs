//! Role management command handlers

use teloxide::{Bot, types::{Message, Recipient}, prelude::*};
use tracing::{debug, warn};
use crate::database::RoleTable;
use crate::models::{ActorRole, RoleMember};
use crate::services::ServiceFactory;
use crate::utils::errors::{RelayError, Result};
use crate::utils::helpers::{parse_user_reference, UserReference};
use crate::utils::logging::log_admin_action;

fn sender_id(msg: &Message) -> Result<i64> {
    msg.from
        .as_ref()
        .map(|user| user.id.0 as i64)
        .ok_or_else(|| RelayError::InvalidInput("No user in message".to_string()))
}

/// Check the sender's role, replying with a refusal when it is too low
pub(crate) async fn authorize_sender(
    bot: &Bot,
    msg: &Message,
    services: &ServiceFactory,
    minimum: ActorRole,
) -> Result<Option<i64>> {
    let user_id = sender_id(msg)?;
    match services.permissions.require(user_id, minimum) {
        Ok(_) => Ok(Some(user_id)),
        Err(RelayError::PermissionDenied(reason)) => {
            debug!(user_id, reason = %reason, "Command refused");
            bot.send_message(msg.chat.id, "⛔ Permission denied").await?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve a command argument to a user id and optional username
async fn resolve_user(
    bot: &Bot,
    services: &ServiceFactory,
    table: RoleTable,
    arg: &str,
) -> Result<Option<(i64, Option<String>)>> {
    match parse_user_reference(arg) {
        Some(UserReference::Id(user_id)) => Ok(Some((user_id, None))),
        Some(UserReference::Username(username)) => {
            if let Some(member) = services.database.roles.find_by_username(table, &username).await? {
                return Ok(Some((member.user_id, member.username)));
            }
            // Only works once the user has talked to the bot
            match bot.get_chat(Recipient::ChannelUsername(format!("@{}", username))).await {
                Ok(chat) => Ok(Some((chat.id.0, Some(username)))),
                Err(e) => {
                    warn!(username = %username, error = %e, "Failed to resolve username");
                    Ok(None)
                }
            }
        }
        None => Ok(None),
    }
}

fn format_members(title: &str, members: &[RoleMember]) -> String {
    if members.is_empty() {
        return format!("{}: none", title);
    }
    let lines: Vec<String> = members.iter().map(|m| format!("• {}", m)).collect();
    format!("{} ({}):\n{}", title, members.len(), lines.join("\n"))
}

async fn grant_role(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    arg: String,
    table: RoleTable,
    minimum: ActorRole,
    action: &str,
) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, minimum).await? else {
        return Ok(());
    };

    let usage = format!("Usage: /{} <user_id|@username>", action);
    if arg.trim().is_empty() {
        bot.send_message(msg.chat.id, usage).await?;
        return Ok(());
    }

    let Some((user_id, username)) = resolve_user(&bot, &services, table, &arg).await? else {
        bot.send_message(
            msg.chat.id,
            "❓ Could not resolve that user. Ask them to message the bot first or use the numeric user id.",
        )
        .await?;
        return Ok(());
    };

    let member = services
        .permissions
        .grant(&services.database.roles, table, user_id, username.as_deref())
        .await?;
    log_admin_action(admin_id, action, Some(&member.to_string()), None);

    bot.send_message(msg.chat.id, format!("✅ Granted: {}", member)).await?;
    Ok(())
}

async fn revoke_role(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    arg: String,
    table: RoleTable,
    minimum: ActorRole,
    action: &str,
) -> Result<()> {
    let Some(admin_id) = authorize_sender(&bot, &msg, &services, minimum).await? else {
        return Ok(());
    };

    let Some((user_id, _)) = resolve_user(&bot, &services, table, &arg).await? else {
        bot.send_message(msg.chat.id, format!("Usage: /{} <user_id|@username>", action)).await?;
        return Ok(());
    };

    let removed = services
        .permissions
        .revoke(&services.database.roles, table, user_id)
        .await?;
    log_admin_action(admin_id, action, Some(&user_id.to_string()), None);

    let text = if removed {
        format!("✅ Revoked: {}", user_id)
    } else {
        format!("ℹ️ {} held no such role", user_id)
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /authorize - grant controller rights (owner only)
pub async fn handle_authorize(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    grant_role(bot, msg, services, arg, RoleTable::Controllers, ActorRole::Owner, "authorize").await
}

/// Handle /unauthorize - revoke controller rights (owner only)
pub async fn handle_unauthorize(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    revoke_role(bot, msg, services, arg, RoleTable::Controllers, ActorRole::Owner, "unauthorize").await
}

/// Handle /set_broadcaster
pub async fn handle_set_broadcaster(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    grant_role(bot, msg, services, arg, RoleTable::Broadcasters, ActorRole::Controller, "set_broadcaster").await
}

/// Handle /unset_broadcaster
pub async fn handle_unset_broadcaster(bot: Bot, msg: Message, services: ServiceFactory, arg: String) -> Result<()> {
    revoke_role(bot, msg, services, arg, RoleTable::Broadcasters, ActorRole::Controller, "unset_broadcaster").await
}

/// Handle /list_controllers
pub async fn handle_list_controllers(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if authorize_sender(&bot, &msg, &services, ActorRole::Owner).await?.is_none() {
        return Ok(());
    }
    let members = services.database.roles.list(RoleTable::Controllers).await?;
    bot.send_message(msg.chat.id, format_members("Controllers", &members)).await?;
    Ok(())
}

/// Handle /list_broadcasters
pub async fn handle_list_broadcasters(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if authorize_sender(&bot, &msg, &services, ActorRole::Controller).await?.is_none() {
        return Ok(());
    }
    let members = services.database.roles.list(RoleTable::Broadcasters).await?;
    bot.send_message(msg.chat.id, format_members("Broadcasters", &members)).await?;
    Ok(())
}
