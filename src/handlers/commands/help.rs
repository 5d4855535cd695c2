//! Help command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::models::ActorRole;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

fn help_text(role: ActorRole) -> String {
    let mut text = String::from(
        "🤖 LinguaRelay Help\n\n\
        In activated groups every message is translated between Chinese and English.\n\
        Start a message with /notranslate to keep it untranslated.\n\n\
        /help - Show this help message",
    );

    if role >= ActorRole::Broadcaster {
        text.push_str(
            "\n\nBroadcasting:\n\
            Send any message here and it is copied to every active group.\n\
            /list_groups - List active groups",
        );
    }
    if role >= ActorRole::Controller {
        text.push_str(
            "\n\nAdministration:\n\
            /set_broadcaster <id|@user> - Grant broadcaster rights\n\
            /unset_broadcaster <id|@user> - Revoke broadcaster rights\n\
            /list_broadcasters - List broadcasters\n\
            /remove_group <chat_id> - Remove a group\n\
            /set_mode <chat_id> <auto|en|zh> - Set a group's translation target\n\
            /translation <chat_id> <on|off> - Turn translation in a group on or off\n\
            /check_groups - Probe groups and clean up dead ones\n\
            /stats - Statistics\n\
            /preview <chat_id> <text> - Send a test message",
        );
    }
    if role == ActorRole::Owner {
        text.push_str(
            "\n\nOwner:\n\
            /authorize <id|@user> - Grant controller rights\n\
            /unauthorize <id|@user> - Revoke controller rights\n\
            /list_controllers - List controllers",
        );
    }
    text
}

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let role = msg
        .from
        .as_ref()
        .map(|user| services.permissions.resolve(user.id.0 as i64))
        .unwrap_or(ActorRole::None);

    bot.send_message(msg.chat.id, help_text(role)).await?;
    Ok(())
}
