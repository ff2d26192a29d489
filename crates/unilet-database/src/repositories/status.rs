//! User status repository implementation.

use sqlx::PgPool;

use unilet_core::error::{AppError, ErrorKind};
use unilet_core::result::AppResult;
use unilet_entity::status::{StatusChange, UserStatus};

/// Repository for the `user_statuses` table.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    pool: PgPool,
}

impl StatusRepository {
    /// Create a new status repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert-if-absent-else-update a user's status row.
    ///
    /// `is_active` is derived from the new state, not from connection
    /// counts, and `last_seen` is always refreshed.
    pub async fn upsert(&self, change: &StatusChange) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_statuses (user_id, status, last_seen, is_active, current_activity, location) \
             VALUES ($1, $2, NOW(), $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 status = EXCLUDED.status, \
                 last_seen = EXCLUDED.last_seen, \
                 is_active = EXCLUDED.is_active, \
                 current_activity = EXCLUDED.current_activity, \
                 location = EXCLUDED.location",
        )
        .bind(change.user_id)
        .bind(change.status)
        .bind(change.is_active())
        .bind(&change.current_activity)
        .bind(&change.location)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user status", e))?;
        Ok(())
    }

    /// Find a user's status row.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Option<UserStatus>> {
        sqlx::query_as::<_, UserStatus>("SELECT * FROM user_statuses WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user status", e))
    }

    /// Find status rows for a set of users.
    pub async fn find_by_users(&self, user_ids: &[i64]) -> AppResult<Vec<UserStatus>> {
        sqlx::query_as::<_, UserStatus>(
            "SELECT * FROM user_statuses WHERE user_id = ANY($1) ORDER BY user_id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user statuses", e))
    }

    /// List all users whose persisted `is_active` flag is set.
    pub async fn find_active(&self) -> AppResult<Vec<UserStatus>> {
        sqlx::query_as::<_, UserStatus>(
            "SELECT * FROM user_statuses WHERE is_active = TRUE ORDER BY last_seen DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active users", e))
    }

    /// Force every status row offline. Used by the hard-reset shutdown.
    pub async fn set_all_offline(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_statuses SET status = 'offline', is_active = FALSE, last_seen = NOW()",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set all users offline", e)
        })?;
        Ok(result.rows_affected())
    }
}
