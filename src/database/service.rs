//! Database service layer
//!
//! This module provides a high-level interface to database operations

use serde::Serialize;
use crate::database::{DatabasePool, GroupRepository, RoleRepository, BroadcastRepository, TranslationLogRepository};
use crate::database::repositories::{BroadcastTotals, TranslationTotals};
use crate::utils::errors::RelayError;

/// Aggregate counters shown by `/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub active_groups: i64,
    pub broadcasts: i64,
    pub deliveries: i64,
    pub delivery_success: i64,
    pub delivery_failure: i64,
    pub translations: i64,
    pub translated_groups: i64,
}

impl RelayStats {
    fn from_parts(active_groups: i64, broadcasts: BroadcastTotals, translations: TranslationTotals) -> Self {
        Self {
            active_groups,
            broadcasts: broadcasts.broadcasts,
            deliveries: broadcasts.deliveries,
            delivery_success: broadcasts.success,
            delivery_failure: broadcasts.failure,
            translations: translations.succeeded,
            translated_groups: translations.groups,
        }
    }

    pub fn summary_text(&self) -> String {
        format!(
            "📊 Stats\nActive groups: {}\nBroadcasts: {}\nDeliveries: {} (✅ {} / ❌ {})\nTranslations: {} across {} groups",
            self.active_groups,
            self.broadcasts,
            self.deliveries,
            self.delivery_success,
            self.delivery_failure,
            self.translations,
            self.translated_groups
        )
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub groups: GroupRepository,
    pub roles: RoleRepository,
    pub broadcasts: BroadcastRepository,
    pub translation_logs: TranslationLogRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            groups: GroupRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            broadcasts: BroadcastRepository::new(pool.clone()),
            translation_logs: TranslationLogRepository::new(pool),
        }
    }

    /// Collect the counters for `/stats`
    pub async fn get_stats(&self) -> Result<RelayStats, RelayError> {
        let active_groups = self.groups.count_active().await?;
        let broadcasts = self.broadcasts.totals().await?;
        let translations = self.translation_logs.totals().await?;

        Ok(RelayStats::from_parts(active_groups, broadcasts, translations))
    }
}
