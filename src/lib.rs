//! LinguaRelay Telegram Bot
//!
//! A Telegram bot that auto-translates group chats between Chinese and English
//! and relays messages from authorized broadcasters to every activated group.
//! This library provides the translator chain, the broadcast dispatcher, the
//! permission and rate-limit gates, and the SQLite-backed group registry.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{RelayError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{RelayService, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
