//! Behavioral tests for the presence engine, run against the in-memory
//! store with channel-backed fake connections. No sockets, no database.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use unilet_core::config::presence::PresenceConfig;
use unilet_entity::status::PresenceState;
use unilet_presence::broadcast::AllConnections;
use unilet_presence::registry::SocketId;
use unilet_presence::service::PresenceService;
use unilet_presence::store::MemoryStatusStore;
use unilet_presence::verify::AcceptAllVerifier;

fn service_with_store() -> (Arc<PresenceService>, Arc<MemoryStatusStore>) {
    let store = Arc::new(MemoryStatusStore::new());
    let service = Arc::new(PresenceService::new(
        store.clone(),
        Arc::new(AcceptAllVerifier),
        Arc::new(AllConnections),
        PresenceConfig::default(),
    ));
    (service, store)
}

/// Open a fake connection and authenticate it.
async fn connect(
    service: &PresenceService,
    user_id: i64,
) -> (SocketId, mpsc::Sender<String>, mpsc::Receiver<String>) {
    let socket_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(16);
    let auth = format!(r#"{{"type":"auth","userId":{user_id}}}"#);
    service.handle_frame(socket_id, &tx, &auth).await;
    (socket_id, tx, rx)
}

/// Collect every frame already delivered to a connection.
fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(text) = rx.try_recv() {
        frames.push(serde_json::from_str(&text).unwrap());
    }
    frames
}

#[tokio::test]
async fn test_auth_marks_user_online_and_notifies_others() {
    let (service, _store) = service_with_store();

    let (_, _tx1, mut observer_rx) = connect(&service, 1).await;
    drain(&mut observer_rx);

    let (_, _tx2, mut origin_rx) = connect(&service, 2).await;

    // The origin gets exactly the handshake acknowledgement.
    let origin_frames = drain(&mut origin_rx);
    assert_eq!(origin_frames.len(), 1);
    assert_eq!(origin_frames[0]["type"], "auth_success");
    assert_eq!(origin_frames[0]["userId"], 2);

    // The observer learns user 2 came online.
    let observed = drain(&mut observer_rx);
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0]["type"], "status_update");
    assert_eq!(observed[0]["userId"], 2);
    assert_eq!(observed[0]["status"], "online");

    let status = service.get_user_status(2).await.unwrap();
    assert_eq!(status.status, PresenceState::Online);
    assert!(status.is_active);
    assert_eq!(service.registry().connection_count(), 2);
}

#[tokio::test]
async fn test_status_update_persists_and_broadcasts() {
    let (service, _store) = service_with_store();
    let (socket_id, tx, mut rx) = connect(&service, 42).await;
    drain(&mut rx);

    service
        .handle_frame(
            socket_id,
            &tx,
            r#"{"type":"status_update","userId":42,"status":"away","activity":"browsing","location":"library"}"#,
        )
        .await;

    // Status changes echo back to the originator too.
    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "status_update");
    assert_eq!(frames[0]["status"], "away");
    assert_eq!(frames[0]["activity"], "browsing");
    assert_eq!(frames[0]["location"], "library");

    let status = service.get_user_status(42).await.unwrap();
    assert_eq!(status.status, PresenceState::Away);
    assert!(!status.is_active);
    assert_eq!(status.current_activity.as_deref(), Some("browsing"));
}

#[tokio::test]
async fn test_ping_refreshes_heartbeat_without_side_effects() {
    let (service, _store) = service_with_store();
    let (socket_id, tx, mut rx) = connect(&service, 5).await;
    let (_, _tx2, mut observer_rx) = connect(&service, 6).await;
    drain(&mut rx);
    drain(&mut observer_rx);

    let handle = service.registry().get(&socket_id).unwrap();
    let before = handle.last_heartbeat().await;

    service
        .handle_frame(socket_id, &tx, r#"{"type":"ping"}"#)
        .await;

    assert!(handle.last_heartbeat().await >= before);
    assert!(drain(&mut rx).is_empty());
    assert!(drain(&mut observer_rx).is_empty());
    assert_eq!(
        service.get_user_status(5).await.unwrap().status,
        PresenceState::Online
    );
}

#[tokio::test]
async fn test_silent_connection_is_evicted_by_supervisor() {
    let store = Arc::new(MemoryStatusStore::new());
    let service = Arc::new(PresenceService::new(
        store.clone(),
        Arc::new(AcceptAllVerifier),
        Arc::new(AllConnections),
        PresenceConfig {
            heartbeat_interval_seconds: 1,
            heartbeat_timeout_seconds: 1,
            channel_buffer_size: 16,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let supervisor = tokio::spawn(unilet_presence::heartbeat::run_supervisor(
        service.clone(),
        shutdown_rx,
    ));

    let (_, _tx, _rx) = connect(&service, 11).await;
    assert_eq!(service.registry().connection_count(), 1);

    // Never reply to the probes; the second scan finds the connection
    // past the timeout and evicts it.
    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

    assert_eq!(service.registry().connection_count(), 0);
    let status = service.get_user_status(11).await.unwrap();
    assert_eq!(status.status, PresenceState::Offline);
    assert!(!status.is_active);

    shutdown_tx.send(true).unwrap();
    supervisor.await.unwrap();
}

#[tokio::test]
async fn test_disconnect_runs_at_most_once() {
    let (service, _store) = service_with_store();
    let (_, _tx1, mut observer_rx) = connect(&service, 1).await;
    let (socket_id, _tx2, _rx) = connect(&service, 2).await;
    drain(&mut observer_rx);

    service.disconnect(socket_id).await;
    service.disconnect(socket_id).await;

    let frames = drain(&mut observer_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "status_update");
    assert_eq!(frames[0]["userId"], 2);
    assert_eq!(frames[0]["status"], "offline");
}

#[tokio::test]
async fn test_any_disconnect_forces_user_offline() {
    let (service, _store) = service_with_store();
    let (_, _tx1, mut observer_rx) = connect(&service, 1).await;
    let (device_a, _tx_a, _rx_a) = connect(&service, 9).await;
    let (_device_b, _tx_b, mut rx_b) = connect(&service, 9).await;
    drain(&mut observer_rx);
    drain(&mut rx_b);

    service.disconnect(device_a).await;

    // Device B is still connected, but the user is offline anyway: status
    // follows the most recent event, not live connection counts.
    assert_eq!(service.registry().user_connections(9).len(), 1);
    let status = service.get_user_status(9).await.unwrap();
    assert_eq!(status.status, PresenceState::Offline);

    let observed = drain(&mut observer_rx);
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0]["status"], "offline");
    // The surviving device hears about its own user going offline.
    assert_eq!(drain(&mut rx_b).len(), 1);
}

#[tokio::test]
async fn test_active_users_tracks_status_not_connections() {
    let (service, _store) = service_with_store();
    let (_, _tx1, _rx1) = connect(&service, 1).await;
    let (socket2, tx2, _rx2) = connect(&service, 2).await;

    service
        .handle_frame(
            socket2,
            &tx2,
            r#"{"type":"status_update","userId":2,"status":"busy"}"#,
        )
        .await;

    // Both users hold live connections, but only user 1 is active.
    assert_eq!(service.registry().connection_count(), 2);
    let active = service.get_active_users().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user_id, 1);
}

#[tokio::test]
async fn test_bad_frames_are_dropped_silently() {
    let (service, _store) = service_with_store();
    let (socket_id, tx, mut rx) = connect(&service, 3).await;
    drain(&mut rx);

    service.handle_frame(socket_id, &tx, "not json at all").await;
    service
        .handle_frame(socket_id, &tx, r#"{"type":"subscribe"}"#)
        .await;
    service.handle_frame(socket_id, &tx, r#"{"type":"auth"}"#).await;

    // No error frames, no disconnect; the connection keeps working.
    assert!(drain(&mut rx).is_empty());
    assert_eq!(service.registry().connection_count(), 1);
    service
        .handle_frame(socket_id, &tx, r#"{"type":"ping"}"#)
        .await;
    assert_eq!(service.registry().connection_count(), 1);
}

#[tokio::test]
async fn test_frames_before_auth_are_ignored() {
    let (service, store) = service_with_store();
    let socket_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel(16);

    service
        .handle_frame(
            socket_id,
            &tx,
            r#"{"type":"status_update","userId":8,"status":"online"}"#,
        )
        .await;
    service
        .handle_frame(
            socket_id,
            &tx,
            r#"{"type":"activity","userId":8,"activityType":"page_view"}"#,
        )
        .await;
    service
        .handle_frame(socket_id, &tx, r#"{"type":"ping"}"#)
        .await;

    assert!(drain(&mut rx).is_empty());
    assert!(store.activity_log().is_empty());
    assert!(service.get_user_status(8).await.unwrap().status == PresenceState::Offline);
}

#[tokio::test]
async fn test_activity_is_recorded_without_broadcast() {
    let (service, store) = service_with_store();
    let (socket_id, tx, mut rx) = connect(&service, 7).await;
    let (_, _tx2, mut observer_rx) = connect(&service, 8).await;
    drain(&mut rx);
    drain(&mut observer_rx);

    service
        .handle_frame(
            socket_id,
            &tx,
            r#"{"type":"activity","userId":7,"activityType":"page_view","activityData":"property:17"}"#,
        )
        .await;

    let log = store.activity_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].user_id, 7);
    assert_eq!(log[0].activity_type, "page_view");
    assert_eq!(log[0].activity_data.as_deref(), Some("property:17"));

    // Activity is an audit write, not a presence event.
    assert!(drain(&mut rx).is_empty());
    assert!(drain(&mut observer_rx).is_empty());
}

#[tokio::test]
async fn test_shutdown_resets_all_presence_state() {
    let (service, store) = service_with_store();
    let (_, _tx1, _rx1) = connect(&service, 1).await;
    let (_, _tx2, _rx2) = connect(&service, 2).await;

    service.shutdown().await;

    assert_eq!(service.registry().connection_count(), 0);
    assert_eq!(store.connection_rows(), 0);
    for user_id in [1, 2] {
        let status = service.get_user_status(user_id).await.unwrap();
        assert_eq!(status.status, PresenceState::Offline);
        assert!(!status.is_active);
    }
}
