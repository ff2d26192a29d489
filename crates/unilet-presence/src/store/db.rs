//! PostgreSQL-backed status store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use unilet_core::result::AppResult;
use unilet_database::repositories::activity::ActivityRepository;
use unilet_database::repositories::connection::ConnectionRepository;
use unilet_database::repositories::status::StatusRepository;
use unilet_entity::activity::NewActivity;
use unilet_entity::connection::ActiveConnection;
use unilet_entity::status::{StatusChange, UserStatus};

use super::StatusStore;

/// Production [`StatusStore`] delegating to the sqlx repositories.
#[derive(Debug, Clone)]
pub struct DbStatusStore {
    statuses: StatusRepository,
    connections: ConnectionRepository,
    activities: ActivityRepository,
}

impl DbStatusStore {
    /// Create a store over a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            statuses: StatusRepository::new(pool.clone()),
            connections: ConnectionRepository::new(pool.clone()),
            activities: ActivityRepository::new(pool),
        }
    }
}

#[async_trait]
impl StatusStore for DbStatusStore {
    async fn upsert_status(&self, change: &StatusChange) -> AppResult<()> {
        self.statuses.upsert(change).await
    }

    async fn get_status(&self, user_id: i64) -> AppResult<Option<UserStatus>> {
        self.statuses.find_by_user(user_id).await
    }

    async fn get_users_status(&self, user_ids: &[i64]) -> AppResult<Vec<UserStatus>> {
        self.statuses.find_by_users(user_ids).await
    }

    async fn get_active_users(&self) -> AppResult<Vec<UserStatus>> {
        self.statuses.find_active().await
    }

    async fn append_activity(&self, activity: &NewActivity) -> AppResult<()> {
        self.activities.append(activity).await
    }

    async fn insert_connection(&self, conn: &ActiveConnection) -> AppResult<()> {
        self.connections.insert(conn).await
    }

    async fn touch_connection(&self, socket_id: Uuid) -> AppResult<()> {
        self.connections.touch(socket_id).await
    }

    async fn delete_connection(&self, socket_id: Uuid) -> AppResult<bool> {
        self.connections.delete(socket_id).await
    }

    async fn reset_all(&self) -> AppResult<u64> {
        let statuses = self.statuses.set_all_offline().await?;
        let connections = self.connections.clear_all().await?;
        Ok(statuses + connections)
    }
}
