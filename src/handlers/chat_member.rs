//! Bot membership updates

use teloxide::types::{ChatMemberKind, ChatMemberUpdated};
use tracing::debug;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_group_event;

/// Deactivate a group once the bot has been removed from it
pub async fn handle_my_chat_member(update: ChatMemberUpdated, services: ServiceFactory) -> Result<()> {
    let chat_id = update.chat.id.0;
    let reason = match update.new_chat_member.kind {
        ChatMemberKind::Banned(_) => "bot was kicked",
        ChatMemberKind::Left => "bot left the chat",
        _ => {
            debug!(chat_id, "Bot membership changed");
            return Ok(());
        }
    };

    if services.database.groups.deactivate(chat_id, reason).await? {
        log_group_event(chat_id, "deactivated", Some(reason));
    }
    Ok(())
}
