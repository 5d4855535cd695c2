//! Error handling for LinguaRelay
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for LinguaRelay application
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Translation provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Broadcast rate limit exceeded for user {user_id}")]
    RateLimited { user_id: i64 },

    #[error("Group not found: {chat_id}")]
    GroupNotFound { chat_id: i64 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Translation provider specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} is not configured: {reason}")]
    NotConfigured { provider: String, reason: String },

    #[error("translation request timed out")]
    Timeout,

    #[error("translation request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether another attempt against the same provider can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::NotConfigured { .. } => false,
            ProviderError::Timeout => true,
            ProviderError::RequestFailed(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }
}

/// Result type alias for LinguaRelay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Result type alias for translation provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl RelayError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RelayError::Database(_) => ErrorSeverity::Critical,
            RelayError::Migration(_) => ErrorSeverity::Critical,
            RelayError::Config(_) => ErrorSeverity::Critical,
            RelayError::PermissionDenied(_) => ErrorSeverity::Warning,
            RelayError::RateLimited { .. } => ErrorSeverity::Warning,
            RelayError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
