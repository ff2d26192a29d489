//! Status event fan-out.
//!
//! Audience selection is a seam: the shipped [`AllConnections`] resolver
//! pushes every status event to every live connection, which is O(total
//! connections) per event and fine for a single-campus deployment. A
//! contacts-only or property-scoped resolver can replace it without
//! changing the dispatch path.

use std::sync::Arc;

use crate::frames::OutboundFrame;
use crate::registry::{ConnectionHandle, ConnectionRegistry, SocketId};

/// Selects which connections receive a status event.
pub trait AudienceResolver: Send + Sync {
    /// Resolve the target handles for one event.
    fn resolve(
        &self,
        registry: &ConnectionRegistry,
        event: &OutboundFrame,
    ) -> Vec<Arc<ConnectionHandle>>;
}

/// Global fan-out: every live connection across all users.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllConnections;

impl AudienceResolver for AllConnections {
    fn resolve(
        &self,
        registry: &ConnectionRegistry,
        _event: &OutboundFrame,
    ) -> Vec<Arc<ConnectionHandle>> {
        registry.all_connections()
    }
}

/// Serialize an event once and push it to every target.
///
/// Per-connection delivery failures are logged and skipped; fan-out is
/// best-effort by contract.
pub fn fanout(targets: &[Arc<ConnectionHandle>], event: &OutboundFrame, exclude: Option<SocketId>) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize broadcast event");
            return;
        }
    };

    for handle in targets {
        if Some(handle.id) == exclude {
            continue;
        }
        if !handle.send(text.clone()) {
            tracing::debug!(socket_id = %handle.id, "Broadcast delivery failed");
        }
    }
}
