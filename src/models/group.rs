//! Group model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::models::translation::Lang;

/// Per-group translation target setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Pick the direction from the message text
    #[default]
    Auto,
    En,
    Zh,
}

impl LanguageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageMode::Auto => "auto",
            LanguageMode::En => "en",
            LanguageMode::Zh => "zh",
        }
    }

    /// Forced target language, `None` in auto mode
    pub fn forced_target(&self) -> Option<Lang> {
        match self {
            LanguageMode::Auto => None,
            LanguageMode::En => Some(Lang::En),
            LanguageMode::Zh => Some(Lang::Zh),
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(LanguageMode::Auto),
            "en" => Ok(LanguageMode::En),
            "zh" => Ok(LanguageMode::Zh),
            other => Err(format!("unsupported language mode: {}", other)),
        }
    }
}

impl TryFrom<String> for LanguageMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Persisted state of one target chat
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupRecord {
    pub chat_id: i64,
    pub title: String,
    pub activated_by: i64,
    pub activated_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub language_mode: LanguageMode,
    pub active: bool,
    pub translation_enabled: bool,
    pub deactivated_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GroupRecord {
    /// Whether group messages should go through the translator chain
    pub fn accepts_translation(&self) -> bool {
        self.active && self.translation_enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateGroupRequest {
    pub chat_id: i64,
    pub title: String,
    pub activated_by: i64,
    pub language_mode: Option<LanguageMode>,
}
