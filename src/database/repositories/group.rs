//! Group repository implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::Utc;
use tracing::debug;
use crate::models::group::{GroupRecord, ActivateGroupRequest, LanguageMode};
use crate::services::ports::GroupRegistry;
use crate::utils::errors::RelayError;
use super::returned_row;

const GROUP_COLUMNS: &str = "chat_id, title, activated_by, activated_at, language_mode, active, translation_enabled, deactivated_reason, updated_at";

#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: SqlitePool,
}

impl GroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create or re-activate a group
    pub async fn activate(&self, request: ActivateGroupRequest) -> Result<GroupRecord, RelayError> {
        let now = Utc::now();
        let mode = request.language_mode.unwrap_or_default();
        let rows = sqlx::query_as::<_, GroupRecord>(&format!(
            r#"
            INSERT INTO groups (chat_id, title, activated_by, activated_at, language_mode, active, translation_enabled, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, ?4)
            ON CONFLICT(chat_id) DO UPDATE SET
                title = excluded.title,
                activated_by = excluded.activated_by,
                activated_at = excluded.activated_at,
                language_mode = excluded.language_mode,
                active = 1,
                translation_enabled = 1,
                deactivated_reason = NULL,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(request.chat_id)
        .bind(request.title)
        .bind(request.activated_by)
        .bind(now)
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        returned_row(rows)
    }

    /// Find group by chat ID
    pub async fn find_by_chat_id(&self, chat_id: i64) -> Result<Option<GroupRecord>, RelayError> {
        let group = sqlx::query_as::<_, GroupRecord>(&format!(
            "SELECT {} FROM groups WHERE chat_id = ?1",
            GROUP_COLUMNS
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Active groups, oldest activation first
    pub async fn get_active_groups(&self) -> Result<Vec<GroupRecord>, RelayError> {
        let groups = sqlx::query_as::<_, GroupRecord>(&format!(
            "SELECT {} FROM groups WHERE active = 1 ORDER BY activated_at ASC, chat_id ASC",
            GROUP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Change the translation target of a group
    pub async fn set_language_mode(&self, chat_id: i64, mode: LanguageMode) -> Result<(), RelayError> {
        let result = sqlx::query("UPDATE groups SET language_mode = ?2, updated_at = ?3 WHERE chat_id = ?1")
            .bind(chat_id)
            .bind(mode.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RelayError::GroupNotFound { chat_id });
        }
        Ok(())
    }

    /// Turn translation of group messages on or off without deactivating the group
    pub async fn set_translation_enabled(&self, chat_id: i64, enabled: bool) -> Result<(), RelayError> {
        let result = sqlx::query("UPDATE groups SET translation_enabled = ?2, updated_at = ?3 WHERE chat_id = ?1")
            .bind(chat_id)
            .bind(enabled)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RelayError::GroupNotFound { chat_id });
        }
        Ok(())
    }

    /// Mark a group inactive, keeping the reason
    pub async fn deactivate(&self, chat_id: i64, reason: &str) -> Result<bool, RelayError> {
        let result = sqlx::query(
            "UPDATE groups SET active = 0, deactivated_reason = ?2, updated_at = ?3 WHERE chat_id = ?1"
        )
        .bind(chat_id)
        .bind(reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Move a record to a new chat identity.
    ///
    /// Both statements are writes so the transaction takes the write lock up
    /// front; a concurrent migration of the same record waits on the busy
    /// timeout instead of failing on a stale read snapshot.
    pub async fn migrate(&self, old_chat_id: i64, new_chat_id: i64) -> Result<(), RelayError> {
        if old_chat_id == new_chat_id {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        // Ignored when the new identity is already taken
        let moved = sqlx::query("UPDATE OR IGNORE groups SET chat_id = ?2, updated_at = ?3 WHERE chat_id = ?1")
            .bind(old_chat_id)
            .bind(new_chat_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let retired = sqlx::query("DELETE FROM groups WHERE chat_id = ?1")
            .bind(old_chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(old_chat_id, new_chat_id, moved, retired, "Group identity migrated");
        Ok(())
    }

    /// Delete group
    pub async fn remove(&self, chat_id: i64) -> Result<bool, RelayError> {
        let result = sqlx::query("DELETE FROM groups WHERE chat_id = ?1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count active groups
    pub async fn count_active(&self) -> Result<i64, RelayError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups WHERE active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[async_trait]
impl GroupRegistry for GroupRepository {
    async fn list_active(&self) -> Result<Vec<GroupRecord>, RelayError> {
        self.get_active_groups().await
    }

    async fn migrate(&self, old_chat_id: i64, new_chat_id: i64) -> Result<(), RelayError> {
        GroupRepository::migrate(self, old_chat_id, new_chat_id).await
    }

    async fn deactivate(&self, chat_id: i64, reason: &str) -> Result<(), RelayError> {
        GroupRepository::deactivate(self, chat_id, reason).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::{create_pool, run_migrations, DatabaseConfig};

    async fn repository() -> (tempfile::TempDir, GroupRepository) {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("groups.db").display()),
            ..DatabaseConfig::default()
        };
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, GroupRepository::new(pool))
    }

    fn activation(chat_id: i64, title: &str) -> ActivateGroupRequest {
        ActivateGroupRequest {
            chat_id,
            title: title.to_string(),
            activated_by: 1001,
            language_mode: None,
        }
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let (_dir, repo) = repository().await;

        let group = repo.activate(activation(-100, "Alpha")).await.unwrap();
        assert!(group.active);
        assert_eq!(group.language_mode, LanguageMode::Auto);

        assert!(repo.deactivate(-100, "Forbidden: bot was kicked").await.unwrap());
        let group = repo.find_by_chat_id(-100).await.unwrap().unwrap();
        assert!(!group.active);
        assert_eq!(group.deactivated_reason.as_deref(), Some("Forbidden: bot was kicked"));
        assert!(repo.get_active_groups().await.unwrap().is_empty());

        // Re-activation clears the reason
        let group = repo.activate(activation(-100, "Alpha")).await.unwrap();
        assert!(group.active);
        assert!(group.deactivated_reason.is_none());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let (_dir, repo) = repository().await;
        repo.activate(activation(-300, "Gamma")).await.unwrap();

        repo.migrate(-300, -1003).await.unwrap();
        repo.migrate(-300, -1003).await.unwrap();

        assert!(repo.find_by_chat_id(-300).await.unwrap().is_none());
        let active = repo.get_active_groups().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].chat_id, -1003);
        assert_eq!(active[0].title, "Gamma");
    }

    #[tokio::test]
    async fn test_migrate_onto_existing_identity_retires_old_record() {
        let (_dir, repo) = repository().await;
        repo.activate(activation(-300, "Gamma")).await.unwrap();
        repo.activate(activation(-1003, "Gamma (supergroup)")).await.unwrap();

        repo.migrate(-300, -1003).await.unwrap();

        let active = repo.get_active_groups().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].chat_id, -1003);
    }

    #[tokio::test]
    async fn test_concurrent_migrations_converge() {
        let (_dir, repo) = repository().await;
        repo.activate(activation(-400, "Delta")).await.unwrap();

        let (a, b) = tokio::join!(repo.migrate(-400, -1004), repo.migrate(-400, -1004));
        a.unwrap();
        b.unwrap();

        assert_eq!(repo.count_active().await.unwrap(), 1);
        assert!(repo.find_by_chat_id(-1004).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_group_settings_are_persisted() {
        let (_dir, repo) = repository().await;
        repo.activate(activation(-500, "Epsilon")).await.unwrap();

        repo.set_language_mode(-500, LanguageMode::En).await.unwrap();
        repo.set_translation_enabled(-500, false).await.unwrap();

        let group = repo.find_by_chat_id(-500).await.unwrap().unwrap();
        assert_eq!(group.language_mode, LanguageMode::En);
        assert!(group.active);
        assert!(!group.accepts_translation());

        repo.set_translation_enabled(-500, true).await.unwrap();
        assert!(repo.find_by_chat_id(-500).await.unwrap().unwrap().accepts_translation());

        let err = repo.set_translation_enabled(-999, true).await.unwrap_err();
        assert!(matches!(err, RelayError::GroupNotFound { chat_id: -999 }));
    }

    #[tokio::test]
    async fn test_set_language_mode_unknown_group() {
        let (_dir, repo) = repository().await;
        let err = repo.set_language_mode(-999, LanguageMode::En).await.unwrap_err();
        assert!(matches!(err, RelayError::GroupNotFound { chat_id: -999 }));
    }
}
