//! Command handlers module
//!
//! Admin commands only work in a private chat with the bot.

pub mod admin;
pub mod groups;
pub mod help;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use tracing::debug;
use crate::utils::errors::Result;
use crate::services::ServiceFactory;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "LinguaRelay commands:")]
pub enum Command {
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Grant controller rights: /authorize <user_id|@username> (owner only)")]
    Authorize(String),
    #[command(description = "Revoke controller rights: /unauthorize <user_id|@username> (owner only)")]
    Unauthorize(String),
    #[command(description = "List controllers")]
    ListControllers,
    #[command(description = "Grant broadcaster rights: /set_broadcaster <user_id|@username>")]
    SetBroadcaster(String),
    #[command(description = "Revoke broadcaster rights: /unset_broadcaster <user_id|@username>")]
    UnsetBroadcaster(String),
    #[command(description = "List broadcasters")]
    ListBroadcasters,
    #[command(description = "List active groups")]
    ListGroups,
    #[command(description = "Remove a group: /remove_group <chat_id>")]
    RemoveGroup(String),
    #[command(description = "Set a group's translation target: /set_mode <chat_id> <auto|en|zh>")]
    SetMode(String),
    #[command(description = "Turn translation in a group on or off: /translation <chat_id> <on|off>")]
    Translation(String),
    #[command(description = "Probe every active group and clean up dead ones")]
    CheckGroups,
    #[command(description = "Show broadcast and translation statistics")]
    Stats,
    #[command(description = "Send a test message: /preview <chat_id> <text>")]
    Preview(String),
}

/// Main command dispatcher
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, services: ServiceFactory) -> Result<()> {
    if !msg.chat.is_private() {
        debug!(chat_id = msg.chat.id.0, command = ?cmd, "Ignoring command outside private chat");
        return Ok(());
    }

    match cmd {
        Command::Help => help::handle_help(bot, msg, services).await,
        Command::Authorize(arg) => admin::handle_authorize(bot, msg, services, arg).await,
        Command::Unauthorize(arg) => admin::handle_unauthorize(bot, msg, services, arg).await,
        Command::ListControllers => admin::handle_list_controllers(bot, msg, services).await,
        Command::SetBroadcaster(arg) => admin::handle_set_broadcaster(bot, msg, services, arg).await,
        Command::UnsetBroadcaster(arg) => admin::handle_unset_broadcaster(bot, msg, services, arg).await,
        Command::ListBroadcasters => admin::handle_list_broadcasters(bot, msg, services).await,
        Command::ListGroups => groups::handle_list_groups(bot, msg, services).await,
        Command::RemoveGroup(arg) => groups::handle_remove_group(bot, msg, services, arg).await,
        Command::SetMode(arg) => groups::handle_set_mode(bot, msg, services, arg).await,
        Command::Translation(arg) => groups::handle_translation(bot, msg, services, arg).await,
        Command::CheckGroups => groups::handle_check_groups(bot, msg, services).await,
        Command::Stats => groups::handle_stats(bot, msg, services).await,
        Command::Preview(arg) => groups::handle_preview(bot, msg, services, arg).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help", "relay_bot").unwrap(), Command::Help);
        assert_eq!(
            Command::parse("/set_broadcaster @sender_one", "relay_bot").unwrap(),
            Command::SetBroadcaster("@sender_one".to_string())
        );
        assert_eq!(
            Command::parse("/preview -100123 hello there", "relay_bot").unwrap(),
            Command::Preview("-100123 hello there".to_string())
        );
        assert_eq!(Command::parse("/check_groups", "relay_bot").unwrap(), Command::CheckGroups);
        assert_eq!(
            Command::parse("/set_mode -100123 en", "relay_bot").unwrap(),
            Command::SetMode("-100123 en".to_string())
        );
        assert_eq!(
            Command::parse("/translation -100123 off", "relay_bot").unwrap(),
            Command::Translation("-100123 off".to_string())
        );
    }
}
