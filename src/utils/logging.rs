//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the LinguaRelay application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::models::BroadcastReport;
use crate::utils::errors::{ProviderError, RelayError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, "linguarelay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| RelayError::Config(format!("Invalid log filter {}: {}", config.level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| RelayError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log the outcome of one broadcast delivery
pub fn log_delivery_outcome(chat_id: i64, outcome: &str, attempts: u32, reason: Option<&str>) {
    if reason.is_some() {
        warn!(
            chat_id = chat_id,
            outcome = outcome,
            attempts = attempts,
            reason = reason,
            "Broadcast delivery failed"
        );
    } else {
        debug!(chat_id = chat_id, outcome = outcome, attempts = attempts, "Broadcast delivery finished");
    }
}

/// Log the summary of a finished broadcast job
pub fn log_broadcast_outcome(report: &BroadcastReport) {
    info!(
        job_id = %report.job_id,
        actor_id = report.actor_id,
        content_type = %report.content_type,
        total = report.total,
        success = report.success,
        failure = report.failure,
        skipped = report.skipped,
        "Broadcast finished"
    );
}

/// Log group registry changes caused by delivery signals
pub fn log_group_event(chat_id: i64, event: &str, details: Option<&str>) {
    info!(
        chat_id = chat_id,
        event = event,
        details = details,
        "Group event occurred"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a failed translation provider attempt
pub fn log_provider_failure(provider: &str, attempt: u32, error: &ProviderError) {
    warn!(
        provider = provider,
        attempt = attempt,
        retryable = error.is_retryable(),
        error = %error,
        "Translation provider attempt failed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
