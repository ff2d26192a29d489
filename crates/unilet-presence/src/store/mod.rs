//! Durable status store abstraction.
//!
//! The service consumes a generic persistence seam so the engine can run
//! against PostgreSQL in production ([`db::DbStatusStore`]) or entirely
//! in memory for embedded and test use ([`memory::MemoryStatusStore`]).

pub mod db;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use unilet_core::result::AppResult;
use unilet_entity::activity::NewActivity;
use unilet_entity::connection::ActiveConnection;
use unilet_entity::status::{StatusChange, UserStatus};

pub use db::DbStatusStore;
pub use memory::MemoryStatusStore;

/// Durable operations over the three tables the presence service owns.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Insert-if-absent-else-update a user's status row.
    async fn upsert_status(&self, change: &StatusChange) -> AppResult<()>;

    /// Read one user's status row, if present.
    async fn get_status(&self, user_id: i64) -> AppResult<Option<UserStatus>>;

    /// Read status rows for a set of users.
    async fn get_users_status(&self, user_ids: &[i64]) -> AppResult<Vec<UserStatus>>;

    /// All users whose persisted `is_active` flag is set.
    async fn get_active_users(&self) -> AppResult<Vec<UserStatus>>;

    /// Append one event to the activity audit log.
    async fn append_activity(&self, activity: &NewActivity) -> AppResult<()>;

    /// Insert the durable mirror row for a live connection.
    async fn insert_connection(&self, conn: &ActiveConnection) -> AppResult<()>;

    /// Refresh the heartbeat timestamp on a connection row.
    async fn touch_connection(&self, socket_id: Uuid) -> AppResult<()>;

    /// Delete a connection row. Returns `true` if a row was deleted.
    async fn delete_connection(&self, socket_id: Uuid) -> AppResult<bool>;

    /// Hard reset: force every status offline and clear all connection
    /// rows. Returns the number of rows touched.
    async fn reset_all(&self) -> AppResult<u64>;
}
