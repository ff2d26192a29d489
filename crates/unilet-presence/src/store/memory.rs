//! In-memory status store for embedded and test use.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use unilet_core::result::AppResult;
use unilet_entity::activity::{NewActivity, UserActivity};
use unilet_entity::connection::ActiveConnection;
use unilet_entity::status::{PresenceState, StatusChange, UserStatus};

use super::StatusStore;

/// A [`StatusStore`] that keeps everything in process memory.
///
/// Mirrors the persistence semantics of the database store, including
/// the `is_active == (status == online)` rule applied on upsert.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    statuses: DashMap<i64, UserStatus>,
    connections: DashMap<Uuid, ActiveConnection>,
    activities: DashMap<i64, UserActivity>,
    next_activity_id: AtomicI64,
}

impl MemoryStatusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the activity log, ordered by id.
    pub fn activity_log(&self) -> Vec<UserActivity> {
        let mut log: Vec<UserActivity> =
            self.activities.iter().map(|entry| entry.value().clone()).collect();
        log.sort_by_key(|a| a.id);
        log
    }

    /// Number of stored connection rows.
    pub fn connection_rows(&self) -> usize {
        self.connections.len()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn upsert_status(&self, change: &StatusChange) -> AppResult<()> {
        self.statuses.insert(
            change.user_id,
            UserStatus {
                user_id: change.user_id,
                status: change.status,
                last_seen: Utc::now(),
                is_active: change.is_active(),
                current_activity: change.current_activity.clone(),
                location: change.location.clone(),
            },
        );
        Ok(())
    }

    async fn get_status(&self, user_id: i64) -> AppResult<Option<UserStatus>> {
        Ok(self.statuses.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn get_users_status(&self, user_ids: &[i64]) -> AppResult<Vec<UserStatus>> {
        let mut statuses: Vec<UserStatus> = user_ids
            .iter()
            .filter_map(|id| self.statuses.get(id).map(|entry| entry.value().clone()))
            .collect();
        statuses.sort_by_key(|s| s.user_id);
        Ok(statuses)
    }

    async fn get_active_users(&self) -> AppResult<Vec<UserStatus>> {
        let mut active: Vec<UserStatus> = self
            .statuses
            .iter()
            .filter(|entry| entry.value().is_active)
            .map(|entry| entry.value().clone())
            .collect();
        active.sort_by_key(|s| s.user_id);
        Ok(active)
    }

    async fn append_activity(&self, activity: &NewActivity) -> AppResult<()> {
        let id = self.next_activity_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.activities.insert(
            id,
            UserActivity {
                id,
                user_id: activity.user_id,
                activity_type: activity.activity_type.clone(),
                activity_data: activity.activity_data.clone(),
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    async fn insert_connection(&self, conn: &ActiveConnection) -> AppResult<()> {
        self.connections.insert(conn.socket_id, conn.clone());
        Ok(())
    }

    async fn touch_connection(&self, socket_id: Uuid) -> AppResult<()> {
        if let Some(mut conn) = self.connections.get_mut(&socket_id) {
            conn.last_ping = Utc::now();
        }
        Ok(())
    }

    async fn delete_connection(&self, socket_id: Uuid) -> AppResult<bool> {
        Ok(self.connections.remove(&socket_id).is_some())
    }

    async fn reset_all(&self) -> AppResult<u64> {
        let mut touched = 0u64;
        for mut entry in self.statuses.iter_mut() {
            entry.status = PresenceState::Offline;
            entry.is_active = false;
            entry.last_seen = Utc::now();
            touched += 1;
        }
        touched += self.connections.len() as u64;
        self.connections.clear();
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_derives_is_active() {
        let store = MemoryStatusStore::new();

        store
            .upsert_status(&StatusChange::state_only(1, PresenceState::Online))
            .await
            .unwrap();
        assert!(store.get_status(1).await.unwrap().unwrap().is_active);

        store
            .upsert_status(&StatusChange::state_only(1, PresenceState::Away))
            .await
            .unwrap();
        let status = store.get_status(1).await.unwrap().unwrap();
        assert_eq!(status.status, PresenceState::Away);
        assert!(!status.is_active);
    }

    #[tokio::test]
    async fn test_reset_all_clears_connections_and_activity_flags() {
        let store = MemoryStatusStore::new();
        store
            .upsert_status(&StatusChange::state_only(1, PresenceState::Online))
            .await
            .unwrap();
        store
            .insert_connection(&ActiveConnection::new(Uuid::new_v4(), 1, None, None))
            .await
            .unwrap();

        let touched = store.reset_all().await.unwrap();
        assert_eq!(touched, 2);
        assert_eq!(store.connection_rows(), 0);
        assert!(!store.get_status(1).await.unwrap().unwrap().is_active);
    }
}
