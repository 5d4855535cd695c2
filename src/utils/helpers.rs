//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use std::time::Duration;
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Truncate text to at most `max_chars` characters.
///
/// Returns the (possibly shortened) text and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)` plus up to 10% jitter
pub fn exponential_backoff(base: Duration, attempt: u32) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    let delay = base.saturating_mul(factor);
    let jitter_ms = (delay.as_millis() as u64 / 10).max(1);
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
}

/// A user argument given to an admin command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserReference {
    Id(i64),
    Username(String),
}

/// Parse `@username` (5+ word characters) or a numeric user id
pub fn parse_user_reference(arg: &str) -> Option<UserReference> {
    let arg = arg.trim();
    if let Some(username) = arg.strip_prefix('@') {
        let valid = username.chars().count() >= 5
            && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        return valid.then(|| UserReference::Username(username.to_string()));
    }
    arg.parse::<i64>().ok().map(UserReference::Id)
}

/// Characters that end a leading `@mention`
pub const MENTION_SEPARATORS: [char; 4] = [' ', '\n', ':', '：'];

/// Whether the message is nothing but a single `@mention`
pub fn is_bare_mention(text: &str) -> bool {
    let t = text.trim();
    t.starts_with('@') && !t.contains(MENTION_SEPARATORS)
}

/// Split a leading `@mention` off a message.
///
/// Returns `(prefix, rest)`; the prefix is empty when the message does not start
/// with a mention followed by a separator.
pub fn split_mention_prefix(text: &str) -> (&str, &str) {
    if !text.starts_with('@') {
        return ("", text);
    }
    let cut = MENTION_SEPARATORS
        .iter()
        .filter_map(|sep| text.find(*sep))
        .filter(|idx| *idx > 0)
        .min();
    match cut {
        Some(idx) => (text[..idx].trim(), text[idx..].trim_start()),
        None => ("", text),
    }
}

/// Extract a migrated supergroup id (`-100…`) from a Telegram error description
pub fn extract_migrated_chat_id(description: &str) -> Option<i64> {
    static MIGRATED_ID: OnceLock<Option<Regex>> = OnceLock::new();
    let re = MIGRATED_ID.get_or_init(|| Regex::new(r"-100\d+").ok()).as_ref()?;
    re.find(description).and_then(|m| m.as_str().parse().ok())
}
