//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod group;
pub mod role;
pub mod broadcast;
pub mod translation;

// Re-export commonly used models
pub use group::{GroupRecord, LanguageMode, ActivateGroupRequest};
pub use role::{ActorRole, RoleMember};
pub use broadcast::{BroadcastPayload, BroadcastReport, ContentType};
pub use translation::{Lang, TranslationLog, CreateTranslationLogRequest};
