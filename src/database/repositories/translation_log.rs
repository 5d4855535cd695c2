//! Translation log repository

use sqlx::SqlitePool;
use chrono::Utc;
use crate::models::translation::{TranslationLog, CreateTranslationLogRequest};
use crate::utils::errors::RelayError;
use super::returned_row;

/// Translation counters for `/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TranslationTotals {
    pub translations: i64,
    pub succeeded: i64,
    pub groups: i64,
}

#[derive(Debug, Clone)]
pub struct TranslationLogRepository {
    pool: SqlitePool,
}

impl TranslationLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateTranslationLogRequest) -> Result<TranslationLog, RelayError> {
        let rows = sqlx::query_as::<_, TranslationLog>(
            r#"
            INSERT INTO translation_logs (chat_id, message_id, user_id, source_lang, target_lang, provider, success, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id, chat_id, message_id, user_id, source_lang, target_lang, provider, success, created_at
            "#
        )
        .bind(request.chat_id)
        .bind(request.message_id)
        .bind(request.user_id)
        .bind(request.source_lang.map(|lang| lang.code()))
        .bind(request.target_lang.code())
        .bind(request.provider)
        .bind(request.success)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        returned_row(rows)
    }

    pub async fn totals(&self) -> Result<TranslationTotals, RelayError> {
        let totals = sqlx::query_as::<_, TranslationTotals>(
            r#"
            SELECT COUNT(*) AS translations,
                   COALESCE(SUM(success), 0) AS succeeded,
                   COUNT(DISTINCT chat_id) AS groups
            FROM translation_logs
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}
