//! WebSocket upgrade handler.
//!
//! The socket is anonymous until the client sends an `auth` frame; the
//! presence engine owns everything past the upgrade. Each connection
//! gets a writer task draining its outbound channel, so slow clients
//! never block frame dispatch.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// GET /status-ws — WebSocket upgrade
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Drives an established WebSocket connection.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let socket_id = Uuid::new_v4();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let buffer = state.service.config().channel_buffer_size;
    let (tx, mut outbound_rx) = mpsc::channel::<String>(buffer);

    debug!(socket_id = %socket_id, "WebSocket connection opened");

    // Outbound writer: serialized frames from the engine to the wire.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: every text frame goes to the dispatcher.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.service.handle_frame(socket_id, &tx, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            // Protocol-level ping/pong is handled by the transport.
            Ok(_) => {}
            Err(e) => {
                warn!(socket_id = %socket_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Clean close, error, and task death all funnel through the same
    // disconnect path.
    state.service.disconnect(socket_id).await;
    writer.abort();
}
