//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// The single Owner identity; without it nobody holds Owner rights
    pub owner_id: Option<i64>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Primary HTTP translation provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrimaryProviderConfig {
    /// Only `deepl` is supported
    pub provider: String,
    pub api_key: Option<String>,
    /// Overrides the endpoint derived from the key (free vs. pro)
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

/// OpenAI-compatible LLM fallback provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    /// Full chat completions URL; defaults to `{api_base}/chat/completions`
    pub endpoint: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

/// Translator chain configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub primary: PrimaryProviderConfig,
    pub llm: LlmProviderConfig,
    /// Attempts per remote provider before falling through
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub max_output_chars: usize,
    pub skip_prefix: String,
}

impl TranslationConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Broadcast dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    /// Broadcasts a plain Broadcaster may start per hourly window
    pub max_per_hour: u32,
    /// Cap on targeted groups per broadcast
    pub max_groups: usize,
    /// Deliveries in flight at once
    pub concurrency: usize,
    /// Retries after a transient delivery error
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Distinct failure reasons kept in a report
    pub failure_sample_size: usize,
}

impl BroadcastConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("LINGUARELAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::RelayError> {
        super::validation::validate_settings(self)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            primary: PrimaryProviderConfig {
                provider: "deepl".to_string(),
                api_key: None,
                endpoint: None,
                timeout_seconds: 10,
            },
            llm: LlmProviderConfig {
                api_key: None,
                api_base: "https://api.openai.com/v1".to_string(),
                endpoint: None,
                model: "gpt-4o-mini".to_string(),
                timeout_seconds: 20,
            },
            max_attempts: 3,
            backoff_base_ms: 500,
            max_output_chars: 4000,
            skip_prefix: "/notranslate".to_string(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_per_hour: 5,
            max_groups: 500,
            concurrency: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
            failure_sample_size: 10,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                owner_id: None,
            },
            database: DatabaseConfig {
                url: "sqlite://data/linguarelay.db".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            translation: TranslationConfig::default(),
            broadcast: BroadcastConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
            },
        }
    }
}
