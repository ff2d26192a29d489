//! The presence service — ties the registry, store, verifier, and
//! fan-out together behind one explicit value.
//!
//! One `PresenceService` is constructed at process startup and passed by
//! `Arc` to the transport layer and the heartbeat supervisor; there is no
//! global instance.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use unilet_core::config::presence::PresenceConfig;
use unilet_core::result::AppResult;
use unilet_entity::status::{PresenceState, StatusChange, UserStatus};

use crate::broadcast::{self, AudienceResolver};
use crate::frames::OutboundFrame;
use crate::registry::{ConnectionRegistry, SocketId};
use crate::store::StatusStore;
use crate::verify::IdentityVerifier;

/// Real-time presence and activity tracking engine.
pub struct PresenceService {
    registry: ConnectionRegistry,
    store: Arc<dyn StatusStore>,
    verifier: Arc<dyn IdentityVerifier>,
    audience: Arc<dyn AudienceResolver>,
    config: PresenceConfig,
}

impl std::fmt::Debug for PresenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceService")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl PresenceService {
    /// Create a new service.
    pub fn new(
        store: Arc<dyn StatusStore>,
        verifier: Arc<dyn IdentityVerifier>,
        audience: Arc<dyn AudienceResolver>,
        config: PresenceConfig,
    ) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            store,
            verifier,
            audience,
            config,
        }
    }

    /// The live connection registry.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// The durable store.
    pub(crate) fn store(&self) -> &Arc<dyn StatusStore> {
        &self.store
    }

    /// The handshake verifier.
    pub(crate) fn verifier(&self) -> &Arc<dyn IdentityVerifier> {
        &self.verifier
    }

    /// Service configuration.
    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    /// Read one user's presence, defaulting to offline/inactive when the
    /// user has never been seen.
    pub async fn get_user_status(&self, user_id: i64) -> AppResult<UserStatus> {
        Ok(self
            .store
            .get_status(user_id)
            .await?
            .unwrap_or_else(|| UserStatus::offline(user_id)))
    }

    /// Read presence for a set of users. Users without a persisted row
    /// are omitted.
    pub async fn get_users_status(&self, user_ids: &[i64]) -> AppResult<Vec<UserStatus>> {
        self.store.get_users_status(user_ids).await
    }

    /// All users whose persisted `is_active` flag is set.
    ///
    /// Because `is_active` mirrors the last observed status rather than
    /// live connection counts, this set need not equal the set of users
    /// with an open connection.
    pub async fn get_active_users(&self) -> AppResult<Vec<UserStatus>> {
        self.store.get_active_users().await
    }

    /// Tear down a connection: the single cleanup path shared by
    /// transport close, transport error, and heartbeat eviction.
    ///
    /// Runs at most once per connection; later calls are no-ops. The
    /// owning user is forced offline even if other devices remain
    /// connected — user status tracks the last observed event, not a
    /// per-connection count.
    pub async fn disconnect(&self, socket_id: SocketId) {
        let Some(handle) = self.registry.remove(&socket_id) else {
            return;
        };
        handle.mark_dead();

        if let Err(e) = self.store.delete_connection(socket_id).await {
            warn!(socket_id = %socket_id, error = %e, "Failed to delete connection row");
        }

        let change = StatusChange::state_only(handle.user_id, PresenceState::Offline);
        if let Err(e) = self.store.upsert_status(&change).await {
            warn!(user_id = handle.user_id, error = %e, "Failed to persist offline status");
        }

        self.broadcast_status(handle.user_id, PresenceState::Offline, None, None, None);

        info!(
            socket_id = %socket_id,
            user_id = handle.user_id,
            "Connection closed"
        );
    }

    /// Hard-reset shutdown: every user is forced offline and all
    /// connection rows are cleared in bulk. Open sockets are not drained
    /// or notified; the transport layer drops them when the process
    /// exits.
    pub async fn shutdown(&self) {
        for handle in self.registry.all_connections() {
            handle.mark_dead();
            self.registry.remove(&handle.id);
        }

        match self.store.reset_all().await {
            Ok(rows) => info!(rows, "Presence state reset"),
            Err(e) => warn!(error = %e, "Failed to reset presence state"),
        }
    }

    /// Fan a status event out to the resolved audience.
    pub(crate) fn broadcast_status(
        &self,
        user_id: i64,
        status: PresenceState,
        activity: Option<String>,
        location: Option<String>,
        exclude: Option<SocketId>,
    ) {
        let event = OutboundFrame::StatusUpdate {
            user_id,
            status,
            activity,
            location,
            timestamp: Utc::now(),
        };
        let targets = self.audience.resolve(&self.registry, &event);
        broadcast::fanout(&targets, &event, exclude);
    }
}
