//! Broadcast audit repository

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::broadcast::{BroadcastReport, ContentType};
use crate::services::ports::AuditStore;
use crate::utils::errors::RelayError;
use super::returned_row;

#[derive(Debug, FromRow)]
struct BroadcastRow {
    id: i64,
    job_id: String,
    by_user_id: i64,
    content_type: String,
    created_at: DateTime<Utc>,
    total: i64,
    success: i64,
    failure: i64,
    skipped: i64,
    failure_samples: String,
}

impl TryFrom<BroadcastRow> for BroadcastReport {
    type Error = RelayError;

    fn try_from(row: BroadcastRow) -> Result<Self, Self::Error> {
        let job_id = Uuid::parse_str(&row.job_id)
            .map_err(|e| RelayError::InvalidInput(format!("stored job id {}: {}", row.job_id, e)))?;
        let content_type = row.content_type.parse::<ContentType>().unwrap_or(ContentType::Unknown);

        Ok(BroadcastReport {
            id: row.id,
            job_id,
            actor_id: row.by_user_id,
            content_type,
            created_at: row.created_at,
            total: u32::try_from(row.total).unwrap_or(0),
            success: u32::try_from(row.success).unwrap_or(0),
            failure: u32::try_from(row.failure).unwrap_or(0),
            skipped: u32::try_from(row.skipped).unwrap_or(0),
            failure_samples: serde_json::from_str(&row.failure_samples)?,
        })
    }
}

/// Lifetime broadcast counters for `/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct BroadcastTotals {
    pub broadcasts: i64,
    pub deliveries: i64,
    pub success: i64,
    pub failure: i64,
}

#[derive(Debug, Clone)]
pub struct BroadcastRepository {
    pool: SqlitePool,
}

impl BroadcastRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a finished report and return its row id
    pub async fn record(&self, report: &BroadcastReport) -> Result<i64, RelayError> {
        let samples = serde_json::to_string(&report.failure_samples)?;
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO broadcasts (job_id, by_user_id, content_type, created_at, total, success, failure, skipped, failure_samples)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING id
            "#
        )
        .bind(report.job_id.to_string())
        .bind(report.actor_id)
        .bind(report.content_type.as_str())
        .bind(report.created_at)
        .bind(report.total)
        .bind(report.success)
        .bind(report.failure)
        .bind(report.skipped)
        .bind(samples)
        .fetch_all(&self.pool)
        .await?;

        let (id,) = returned_row(rows)?;
        Ok(id)
    }

    pub async fn find_by_job_id(&self, job_id: Uuid) -> Result<Option<BroadcastReport>, RelayError> {
        let row = sqlx::query_as::<_, BroadcastRow>(
            "SELECT id, job_id, by_user_id, content_type, created_at, total, success, failure, skipped, failure_samples FROM broadcasts WHERE job_id = ?1"
        )
        .bind(job_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BroadcastReport::try_from).transpose()
    }

    /// Most recent reports, newest first
    pub async fn recent(&self, limit: i64) -> Result<Vec<BroadcastReport>, RelayError> {
        let rows = sqlx::query_as::<_, BroadcastRow>(
            "SELECT id, job_id, by_user_id, content_type, created_at, total, success, failure, skipped, failure_samples FROM broadcasts ORDER BY id DESC LIMIT ?1"
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BroadcastReport::try_from).collect()
    }

    pub async fn totals(&self) -> Result<BroadcastTotals, RelayError> {
        let totals = sqlx::query_as::<_, BroadcastTotals>(
            r#"
            SELECT COUNT(*) AS broadcasts,
                   COALESCE(SUM(total), 0) AS deliveries,
                   COALESCE(SUM(success), 0) AS success,
                   COALESCE(SUM(failure), 0) AS failure
            FROM broadcasts
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

#[async_trait]
impl AuditStore for BroadcastRepository {
    async fn record_broadcast(&self, report: &BroadcastReport) -> Result<i64, RelayError> {
        self.record(report).await
    }
}
