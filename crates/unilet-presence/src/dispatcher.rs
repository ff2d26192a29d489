//! Inbound frame dispatch.
//!
//! One entry point, [`PresenceService::handle_frame`], receives every
//! text frame from the transport layer. Frames that fail to parse are
//! logged and dropped; no error frame is sent back, the connection
//! simply carries on.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use unilet_entity::activity::NewActivity;
use unilet_entity::connection::ActiveConnection;
use unilet_entity::status::{PresenceState, StatusChange};

use crate::frames::{InboundFrame, OutboundFrame};
use crate::registry::{ConnectionHandle, SocketId};
use crate::service::PresenceService;
use crate::verify::TransportMeta;

impl PresenceService {
    /// Dispatch one raw text frame from a connection.
    ///
    /// `sender` is the outbound channel for this connection; it is only
    /// consumed when an `auth` frame promotes the connection into the
    /// registry.
    pub async fn handle_frame(
        &self,
        socket_id: SocketId,
        sender: &mpsc::Sender<String>,
        raw: &str,
    ) {
        let frame: InboundFrame = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(socket_id = %socket_id, error = %e, "Dropping malformed frame");
                return;
            }
        };

        match frame {
            InboundFrame::Auth {
                user_id,
                user_agent,
                ip_address,
            } => {
                self.handle_auth(socket_id, sender, user_id, user_agent, ip_address)
                    .await;
            }
            InboundFrame::StatusUpdate {
                user_id,
                status,
                activity,
                location,
            } => {
                self.handle_status_update(socket_id, user_id, status, activity, location)
                    .await;
            }
            InboundFrame::Activity {
                user_id,
                activity_type,
                activity_data,
            } => {
                self.handle_activity(socket_id, user_id, activity_type, activity_data)
                    .await;
            }
            InboundFrame::Ping => self.handle_ping(socket_id).await,
        }
    }

    async fn handle_auth(
        &self,
        socket_id: SocketId,
        sender: &mpsc::Sender<String>,
        claimed_user_id: i64,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) {
        let meta = TransportMeta {
            user_agent: user_agent.clone(),
            ip_address: ip_address.clone(),
        };
        let user_id = match self.verifier().verify(claimed_user_id, &meta).await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(socket_id = %socket_id, claimed_user_id, error = %e, "Handshake rejected");
                return;
            }
        };

        // A second auth on the same socket rebinds it; the old
        // registration is torn down first.
        if self.registry().get(&socket_id).is_some() {
            self.disconnect(socket_id).await;
        }

        let handle = Arc::new(ConnectionHandle::new(socket_id, user_id, sender.clone()));
        self.registry().register(handle.clone());

        let row = ActiveConnection::new(socket_id, user_id, user_agent, ip_address);
        if let Err(e) = self.store().insert_connection(&row).await {
            warn!(socket_id = %socket_id, error = %e, "Failed to persist connection row");
        }

        let change = StatusChange::state_only(user_id, PresenceState::Online);
        if let Err(e) = self.store().upsert_status(&change).await {
            warn!(user_id, error = %e, "Failed to persist online status");
        }

        // Everyone else learns the user came online; the origin gets the
        // handshake acknowledgement instead.
        self.broadcast_status(user_id, PresenceState::Online, None, None, Some(socket_id));

        match serde_json::to_string(&OutboundFrame::AuthSuccess { user_id }) {
            Ok(ack) => {
                handle.send(ack);
            }
            Err(e) => warn!(socket_id = %socket_id, error = %e, "Failed to serialize auth ack"),
        }

        info!(socket_id = %socket_id, user_id, "Connection authenticated");
    }

    async fn handle_status_update(
        &self,
        socket_id: SocketId,
        user_id: i64,
        status: PresenceState,
        activity: Option<String>,
        location: Option<String>,
    ) {
        if self.registry().get(&socket_id).is_none() {
            debug!(socket_id = %socket_id, "Status update before auth, ignoring");
            return;
        }

        let change = StatusChange {
            user_id,
            status,
            current_activity: activity.clone(),
            location: location.clone(),
        };
        if let Err(e) = self.store().upsert_status(&change).await {
            warn!(user_id, error = %e, "Failed to persist status update");
        }

        // Status changes go to every connection, the originator included.
        self.broadcast_status(user_id, status, activity, location, None);

        debug!(user_id, status = %status, "Status updated");
    }

    async fn handle_activity(
        &self,
        socket_id: SocketId,
        user_id: i64,
        activity_type: String,
        activity_data: Option<String>,
    ) {
        if self.registry().get(&socket_id).is_none() {
            debug!(socket_id = %socket_id, "Activity before auth, ignoring");
            return;
        }

        let activity = NewActivity {
            user_id,
            activity_type,
            activity_data,
        };
        if let Err(e) = self.store().append_activity(&activity).await {
            warn!(user_id, error = %e, "Failed to record activity");
        }

        debug!(user_id, "Activity recorded");
    }

    async fn handle_ping(&self, socket_id: SocketId) {
        if !self.registry().touch(&socket_id).await {
            debug!(socket_id = %socket_id, "Ping before auth, ignoring");
            return;
        }
        if let Err(e) = self.store().touch_connection(socket_id).await {
            warn!(socket_id = %socket_id, error = %e, "Failed to refresh connection row");
        }
    }
}
