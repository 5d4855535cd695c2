//! Broadcast rate limiting
//!
//! Fixed window per actor: the window opens with the first broadcast and
//! closes an hour later. Owner and Controllers are never counted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use crate::models::ActorRole;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Broadcasts allowed per window
    pub max_requests: u32,
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_duration: Duration::from_secs(3600),
        }
    }
}

impl From<&crate::config::BroadcastConfig> for RateLimitConfig {
    fn from(config: &crate::config::BroadcastConfig) -> Self {
        Self {
            max_requests: config.max_per_hour,
            ..Self::default()
        }
    }
}

/// Per-actor counter
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

impl RateWindow {
    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) > window
    }
}

/// Current window of one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub used: u32,
    pub remaining: u32,
    /// Time left until the window resets, zero when no window is open
    pub resets_in: Duration,
}

#[derive(Debug, Default)]
pub struct BroadcastRateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<i64, RateWindow>>,
}

impl BroadcastRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit and count one broadcast attempt
    pub fn check_and_record(&self, actor: i64, role: ActorRole) -> bool {
        self.check_and_record_at(actor, role, Instant::now())
    }

    /// [`check_and_record`](Self::check_and_record) against an explicit clock
    pub fn check_and_record_at(&self, actor: i64, role: ActorRole, now: Instant) -> bool {
        if role.is_rate_limit_exempt() {
            debug!(actor, %role, "Rate limit exempt");
            return true;
        }

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get_mut(&actor) {
            Some(window) if !window.expired(now, self.config.window_duration) => {
                if window.count >= self.config.max_requests {
                    warn!(actor, count = window.count, "Broadcast rate limit exceeded");
                    return false;
                }
                window.count += 1;
                debug!(actor, count = window.count, "Broadcast counted");
                true
            }
            _ => {
                windows.insert(actor, RateWindow { window_start: now, count: 1 });
                debug!(actor, "Broadcast window opened");
                true
            }
        }
    }

    pub fn status(&self, actor: i64) -> RateLimitStatus {
        self.status_at(actor, Instant::now())
    }

    pub fn status_at(&self, actor: i64, now: Instant) -> RateLimitStatus {
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get(&actor) {
            Some(window) if !window.expired(now, self.config.window_duration) => RateLimitStatus {
                used: window.count,
                remaining: self.config.max_requests.saturating_sub(window.count),
                resets_in: (window.window_start + self.config.window_duration)
                    .saturating_duration_since(now),
            },
            _ => RateLimitStatus {
                used: 0,
                remaining: self.config.max_requests,
                resets_in: Duration::ZERO,
            },
        }
    }
}
