//! User status row and write-side value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::PresenceState;

/// The persisted presence record for a user. One row per user, created on
/// the first handshake and updated on every status, auth, and disconnect
/// event; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStatus {
    /// Platform user identifier.
    pub user_id: i64,
    /// Self-reported availability state.
    pub status: PresenceState,
    /// When the user was last observed.
    pub last_seen: DateTime<Utc>,
    /// Whether the last observed status was `online`.
    ///
    /// This mirrors the status column, NOT a count of live connections:
    /// `is_active == (status == online)`.
    pub is_active: bool,
    /// Short free-form description of what the user is doing.
    pub current_activity: Option<String>,
    /// Short free-form location string.
    pub location: Option<String>,
}

impl UserStatus {
    /// The default record returned for a user with no persisted row.
    pub fn offline(user_id: i64) -> Self {
        Self {
            user_id,
            status: PresenceState::Offline,
            last_seen: Utc::now(),
            is_active: false,
            current_activity: None,
            location: None,
        }
    }
}

/// Fields written by a status upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    /// Platform user identifier.
    pub user_id: i64,
    /// New availability state.
    pub status: PresenceState,
    /// New activity description (replaces the stored value).
    pub current_activity: Option<String>,
    /// New location (replaces the stored value).
    pub location: Option<String>,
}

impl StatusChange {
    /// Build a change record for the given state, clearing activity and
    /// location.
    pub fn state_only(user_id: i64, status: PresenceState) -> Self {
        Self {
            user_id,
            status,
            current_activity: None,
            location: None,
        }
    }

    /// Whether this change marks the user as active.
    pub fn is_active(&self) -> bool {
        self.status == PresenceState::Online
    }
}
