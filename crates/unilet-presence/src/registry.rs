//! Connection registry — the single source of truth for "who is
//! reachable right now."
//!
//! The registry is the only piece of truly shared mutable state in the
//! service; all access goes through the concurrent maps below, so it can
//! be shared freely across the runtime's worker threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Unique connection identifier.
pub type SocketId = Uuid;

/// A handle to a single live connection.
///
/// Holds the sender half of the connection's outbound channel plus the
/// liveness metadata the heartbeat supervisor scans.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Generated socket identifier.
    pub id: SocketId,
    /// User this connection authenticated as.
    pub user_id: i64,
    /// Sender for serialized outbound frames.
    sender: mpsc::Sender<String>,
    /// When the connection authenticated.
    pub connected_at: DateTime<Utc>,
    /// When the last client heartbeat arrived.
    last_heartbeat: RwLock<DateTime<Utc>>,
    /// Whether the connection is still usable.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle for a freshly authenticated connection.
    pub fn new(id: SocketId, user_id: i64, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            sender,
            connected_at: now,
            last_heartbeat: RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Push a serialized frame to this connection without blocking.
    ///
    /// Returns `false` if the frame could not be delivered. A closed
    /// channel marks the handle dead; a full buffer drops the frame.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(socket_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a client heartbeat.
    pub async fn touch(&self) {
        let mut last = self.last_heartbeat.write().await;
        *last = Utc::now();
    }

    /// When the last client heartbeat arrived.
    pub async fn last_heartbeat(&self) -> DateTime<Utc> {
        *self.last_heartbeat.read().await
    }
}

/// Thread-safe map of all live connections, indexed by socket id and by
/// owning user.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Socket id → handle for direct lookup.
    by_id: DashMap<SocketId, Arc<ConnectionHandle>>,
    /// User id → handles (one user can have multiple devices connected).
    by_user: DashMap<i64, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated connection.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Remove a connection.
    ///
    /// Returns `None` if the connection was already removed — callers use
    /// this to guarantee the disconnect path runs at most once per
    /// connection.
    pub fn remove(&self, socket_id: &SocketId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(socket_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *socket_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Get a connection by socket id.
    pub fn get(&self, socket_id: &SocketId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(socket_id).map(|entry| entry.value().clone())
    }

    /// Refresh the heartbeat timestamp for a connection.
    pub async fn touch(&self, socket_id: &SocketId) -> bool {
        match self.get(socket_id) {
            Some(handle) => {
                handle.touch().await;
                true
            }
            None => false,
        }
    }

    /// All live connection handles, for fan-out and supervision.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// All live connections for one user.
    pub fn user_connections(&self, user_id: i64) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total live connection count.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct users with at least one live connection.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(user_id: i64) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(ConnectionHandle::new(Uuid::new_v4(), user_id, tx))
    }

    #[tokio::test]
    async fn test_register_and_remove() {
        let registry = ConnectionRegistry::new();
        let conn = handle(7);
        let socket_id = conn.id;

        registry.register(conn);
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.user_connections(7).len(), 1);

        assert!(registry.remove(&socket_id).is_some());
        // Second removal is a no-op.
        assert!(registry.remove(&socket_id).is_none());
        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.user_count(), 0);
    }

    #[tokio::test]
    async fn test_multi_device_user_index() {
        let registry = ConnectionRegistry::new();
        let a = handle(9);
        let b = handle(9);
        let a_id = a.id;

        registry.register(a);
        registry.register(b);
        assert_eq!(registry.user_connections(9).len(), 2);
        assert_eq!(registry.user_count(), 1);

        registry.remove(&a_id);
        assert_eq!(registry.user_connections(9).len(), 1);
        assert_eq!(registry.user_count(), 1);
    }

    #[tokio::test]
    async fn test_send_to_closed_channel_marks_dead() {
        let (tx, rx) = mpsc::channel(1);
        let conn = ConnectionHandle::new(Uuid::new_v4(), 1, tx);
        drop(rx);

        assert!(!conn.send("{}".to_string()));
        assert!(!conn.is_alive());
    }
}
