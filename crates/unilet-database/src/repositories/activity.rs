//! User activity repository implementation.

use sqlx::PgPool;

use unilet_core::error::{AppError, ErrorKind};
use unilet_core::result::AppResult;
use unilet_entity::activity::NewActivity;

/// Repository for the append-only `user_activities` table.
///
/// Write-only from this service: rows are never updated or read back, the
/// table exists as an audit trail for external analytics.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one activity event.
    pub async fn append(&self, activity: &NewActivity) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_activities (user_id, activity_type, activity_data, timestamp) \
             VALUES ($1, $2, $3, NOW())",
        )
        .bind(activity.user_id)
        .bind(&activity.activity_type)
        .bind(&activity.activity_data)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append activity", e))?;
        Ok(())
    }
}
