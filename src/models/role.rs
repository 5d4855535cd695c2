//! Actor roles

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Privilege level of an actor, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    None,
    Broadcaster,
    Controller,
    Owner,
}

impl ActorRole {
    /// Owner and Controllers bypass the broadcast rate limit
    pub fn is_rate_limit_exempt(&self) -> bool {
        *self >= ActorRole::Controller
    }

    pub fn can_broadcast(&self) -> bool {
        *self >= ActorRole::Broadcaster
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorRole::None => "none",
            ActorRole::Broadcaster => "broadcaster",
            ActorRole::Controller => "controller",
            ActorRole::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// A row of the `controllers` or `broadcasters` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleMember {
    pub user_id: i64,
    pub username: Option<String>,
    pub granted_at: DateTime<Utc>,
}

impl fmt::Display for RoleMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{} @{}", self.user_id, username),
            None => write!(f, "{}", self.user_id),
        }
    }
}
