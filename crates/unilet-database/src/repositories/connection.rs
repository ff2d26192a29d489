//! Active connection repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use unilet_core::error::{AppError, ErrorKind};
use unilet_core::result::AppResult;
use unilet_entity::connection::ActiveConnection;

/// Repository for the `active_connections` table — the durable mirror of
/// the in-memory connection registry.
#[derive(Debug, Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a row for a freshly authenticated connection.
    pub async fn insert(&self, conn: &ActiveConnection) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO active_connections \
                 (socket_id, user_id, connected_at, last_ping, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(conn.socket_id)
        .bind(conn.user_id)
        .bind(conn.connected_at)
        .bind(conn.last_ping)
        .bind(&conn.user_agent)
        .bind(&conn.ip_address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert connection", e))?;
        Ok(())
    }

    /// Refresh the heartbeat timestamp for a connection.
    pub async fn touch(&self, socket_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE active_connections SET last_ping = NOW() WHERE socket_id = $1")
            .bind(socket_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to touch connection", e)
            })?;
        Ok(())
    }

    /// Delete a connection row. Returns `true` if a row was deleted.
    pub async fn delete(&self, socket_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM active_connections WHERE socket_id = $1")
            .bind(socket_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete connection", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// List all connection rows for a user.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<ActiveConnection>> {
        sqlx::query_as::<_, ActiveConnection>(
            "SELECT * FROM active_connections WHERE user_id = $1 ORDER BY connected_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find connections", e))
    }

    /// Delete every connection row. Used by the hard-reset shutdown.
    pub async fn clear_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM active_connections")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear connections", e)
            })?;
        Ok(result.rows_affected())
    }
}
