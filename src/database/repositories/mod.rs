//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod group;
pub mod roles;
pub mod broadcast;
pub mod translation_log;

// Re-export repositories
pub use group::GroupRepository;
pub use roles::{RoleRepository, RoleTable};
pub use broadcast::{BroadcastRepository, BroadcastTotals};
pub use translation_log::{TranslationLogRepository, TranslationTotals};

use crate::utils::errors::RelayError;

/// Single row of an `INSERT ... RETURNING` statement.
///
/// An autocommit write is committed only once its statement runs to
/// completion; `RETURNING` queries must be drained with `fetch_all`.
pub(crate) fn returned_row<T>(rows: Vec<T>) -> Result<T, RelayError> {
    rows.into_iter().next().ok_or(RelayError::Database(sqlx::Error::RowNotFound))
}
