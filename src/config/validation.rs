//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{RelayError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_translation_config(&settings.translation)?;
    validate_broadcast_config(&settings.broadcast)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(RelayError::Config(
            "Bot token is required".to_string()
        ));
    }

    if matches!(config.owner_id, Some(id) if id <= 0) {
        return Err(RelayError::Config(
            "Owner ID must be a positive Telegram user ID".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(RelayError::Config(
            "Database URL is required".to_string()
        ));
    }

    if !config.url.starts_with("sqlite:") {
        return Err(RelayError::Config(
            format!("Only sqlite database URLs are supported, got: {}", config.url)
        ));
    }

    if config.max_connections == 0 {
        return Err(RelayError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(RelayError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate translator chain configuration
fn validate_translation_config(config: &super::TranslationConfig) -> Result<()> {
    if config.primary.provider != "deepl" {
        return Err(RelayError::Config(
            format!("Unsupported primary translation provider: {}", config.primary.provider)
        ));
    }

    if let Some(endpoint) = &config.primary.endpoint {
        url::Url::parse(endpoint)?;
    }

    url::Url::parse(&config.llm.api_base)?;
    if let Some(endpoint) = &config.llm.endpoint {
        url::Url::parse(endpoint)?;
    }

    if config.primary.timeout_seconds == 0 || config.llm.timeout_seconds == 0 {
        return Err(RelayError::Config(
            "Translation provider timeouts must be greater than 0".to_string()
        ));
    }

    if config.max_attempts == 0 {
        return Err(RelayError::Config(
            "Translation max attempts must be greater than 0".to_string()
        ));
    }

    if config.max_output_chars == 0 {
        return Err(RelayError::Config(
            "Translation output ceiling must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate broadcast configuration
fn validate_broadcast_config(config: &super::BroadcastConfig) -> Result<()> {
    if config.max_per_hour == 0 {
        return Err(RelayError::Config(
            "Broadcast hourly ceiling must be greater than 0".to_string()
        ));
    }

    if config.max_groups == 0 {
        return Err(RelayError::Config(
            "Broadcast group cap must be greater than 0".to_string()
        ));
    }

    if config.concurrency == 0 {
        return Err(RelayError::Config(
            "Broadcast concurrency must be greater than 0".to_string()
        ));
    }

    if config.failure_sample_size == 0 {
        return Err(RelayError::Config(
            "Failure sample size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(RelayError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(RelayError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.directory.is_empty() {
        return Err(RelayError::Config(
            "Log directory is required".to_string()
        ));
    }

    Ok(())
}
