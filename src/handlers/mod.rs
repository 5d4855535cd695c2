//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for the private admin commands
//! - Message handlers for group translation and private broadcasts
//! - Chat member handlers for bot removal

pub mod chat_member;
pub mod commands;
pub mod messages;

// Re-export commonly used handler functions
pub use chat_member::handle_my_chat_member;
pub use commands::{handle_command, Command};
pub use messages::handle_message;
