//! Active connection row — the durable mirror of an in-memory registry entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per live WebSocket connection, keyed by the generated socket
/// identifier. Created on a successful handshake, refreshed on every
/// heartbeat, deleted on disconnect or heartbeat timeout.
///
/// A user may own zero, one, or many rows simultaneously (multi-device).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActiveConnection {
    /// Generated socket identifier.
    pub socket_id: Uuid,
    /// Owning platform user.
    pub user_id: i64,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// When the last heartbeat was received.
    pub last_ping: DateTime<Utc>,
    /// User agent reported at handshake, if any.
    pub user_agent: Option<String>,
    /// Remote address reported at handshake, if any.
    pub ip_address: Option<String>,
}

impl ActiveConnection {
    /// Build a fresh row for a connection that just authenticated.
    pub fn new(
        socket_id: Uuid,
        user_id: i64,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            socket_id,
            user_id,
            connected_at: now,
            last_ping: now,
            user_agent,
            ip_address,
        }
    }
}
