//! Controller and broadcaster membership tables

use sqlx::SqlitePool;
use chrono::Utc;
use crate::models::role::RoleMember;
use crate::utils::errors::RelayError;
use super::returned_row;

/// Which membership table a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTable {
    Controllers,
    Broadcasters,
}

impl RoleTable {
    fn table(&self) -> &'static str {
        match self {
            RoleTable::Controllers => "controllers",
            RoleTable::Broadcasters => "broadcasters",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Grant membership, refreshing the stored username on repeat grants
    pub async fn grant(&self, table: RoleTable, user_id: i64, username: Option<&str>) -> Result<RoleMember, RelayError> {
        let rows = sqlx::query_as::<_, RoleMember>(&format!(
            r#"
            INSERT INTO {} (user_id, username, granted_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET username = COALESCE(excluded.username, username)
            RETURNING user_id, username, granted_at
            "#,
            table.table()
        ))
        .bind(user_id)
        .bind(username)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        returned_row(rows)
    }

    /// Revoke membership; false when the user held none
    pub async fn revoke(&self, table: RoleTable, user_id: i64) -> Result<bool, RelayError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?1", table.table()))
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, table: RoleTable) -> Result<Vec<RoleMember>, RelayError> {
        let members = sqlx::query_as::<_, RoleMember>(&format!(
            "SELECT user_id, username, granted_at FROM {} ORDER BY granted_at ASC, user_id ASC",
            table.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn list_ids(&self, table: RoleTable) -> Result<Vec<i64>, RelayError> {
        let ids: Vec<(i64,)> = sqlx::query_as(&format!("SELECT user_id FROM {}", table.table()))
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Look a member up by username (without the leading `@`)
    pub async fn find_by_username(&self, table: RoleTable, username: &str) -> Result<Option<RoleMember>, RelayError> {
        let member = sqlx::query_as::<_, RoleMember>(&format!(
            "SELECT user_id, username, granted_at FROM {} WHERE username = ?1 COLLATE NOCASE",
            table.table()
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }
}
