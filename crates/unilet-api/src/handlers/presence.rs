//! Presence read endpoints.
//!
//! These answer from durable storage, not the connection registry, so
//! they reflect the last persisted status even for users whose sockets
//! have since churned.

use axum::Json;
use axum::extract::{Path, State};

use unilet_entity::status::UserStatus;

use crate::dto::{ApiResponse, PresenceQueryRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/presence/{user_id}
///
/// Never 404s: an unknown user reads as offline.
pub async fn user_status(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserStatus>>, ApiError> {
    let status = state.service.get_user_status(user_id).await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// GET /api/presence — all currently active users.
pub async fn active_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserStatus>>>, ApiError> {
    let users = state.service.get_active_users().await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// POST /api/presence/query — bulk status lookup.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<PresenceQueryRequest>,
) -> Result<Json<ApiResponse<Vec<UserStatus>>>, ApiError> {
    let users = state.service.get_users_status(&request.user_ids).await?;
    Ok(Json(ApiResponse::ok(users)))
}
