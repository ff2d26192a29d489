//! Append-only user activity log rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One appended activity event. Write-only from this service; consumed by
/// external analytics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserActivity {
    /// Auto-assigned row identifier.
    pub id: i64,
    /// Platform user identifier.
    pub user_id: i64,
    /// Event category, e.g. `page_view`.
    pub activity_type: String,
    /// Free-form event payload.
    pub activity_data: Option<String>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Data required to append an activity event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    /// Platform user identifier.
    pub user_id: i64,
    /// Event category.
    pub activity_type: String,
    /// Free-form event payload.
    pub activity_data: Option<String>,
}
