//! REST endpoint tests over the in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use unilet_api::{AppState, build_router};
use unilet_core::config::presence::PresenceConfig;
use unilet_entity::status::{PresenceState, StatusChange};
use unilet_presence::PresenceService;
use unilet_presence::broadcast::AllConnections;
use unilet_presence::store::{MemoryStatusStore, StatusStore};
use unilet_presence::verify::AcceptAllVerifier;

fn test_app() -> (Router, Arc<MemoryStatusStore>) {
    let store = Arc::new(MemoryStatusStore::new());
    let service = Arc::new(PresenceService::new(
        store.clone(),
        Arc::new(AcceptAllVerifier),
        Arc::new(AllConnections),
        PresenceConfig::default(),
    ));
    (build_router(AppState::new(service)), store)
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_reports_connection_counts() {
    let (router, _store) = test_app();

    let (status, body) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["ws_connections"], 0);
    assert_eq!(body["data"]["online_users"], 0);
}

#[tokio::test]
async fn test_user_status_defaults_to_offline() {
    let (router, _store) = test_app();

    let (status, body) = get(&router, "/api/presence/999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], 999);
    assert_eq!(body["data"]["status"], "offline");
    assert_eq!(body["data"]["is_active"], false);
}

#[tokio::test]
async fn test_user_status_reads_persisted_row() {
    let (router, store) = test_app();
    store
        .upsert_status(&StatusChange {
            user_id: 7,
            status: PresenceState::Away,
            current_activity: Some("browsing listings".to_string()),
            location: Some("campus".to_string()),
        })
        .await
        .unwrap();

    let (status, body) = get(&router, "/api/presence/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "away");
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["current_activity"], "browsing listings");
}

#[tokio::test]
async fn test_active_users_lists_only_online() {
    let (router, store) = test_app();
    store
        .upsert_status(&StatusChange::state_only(1, PresenceState::Online))
        .await
        .unwrap();
    store
        .upsert_status(&StatusChange::state_only(2, PresenceState::Busy))
        .await
        .unwrap();

    let (status, body) = get(&router, "/api/presence").await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["user_id"], 1);
}

#[tokio::test]
async fn test_bulk_query_returns_known_users_only() {
    let (router, store) = test_app();
    store
        .upsert_status(&StatusChange::state_only(1, PresenceState::Online))
        .await
        .unwrap();
    store
        .upsert_status(&StatusChange::state_only(3, PresenceState::Away))
        .await
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/presence/query")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"userIds":[1,2,3]}"#))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let users = body["data"].as_array().unwrap();
    // User 2 has no row and is omitted.
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["user_id"], 1);
    assert_eq!(users[1]["user_id"], 3);
}
