//! Route definitions for the Unilet presence API.
//!
//! REST endpoints are mounted under `/api`; the WebSocket upgrade sits
//! at the root. The router receives `AppState` and passes it to all
//! handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/presence", get(handlers::presence::active_users))
        .route("/presence/query", post(handlers::presence::query))
        .route("/presence/{user_id}", get(handlers::presence::user_status))
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .route("/status-ws", get(handlers::ws::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
