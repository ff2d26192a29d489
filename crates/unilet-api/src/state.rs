//! Application state shared across all handlers.

use std::sync::Arc;

use unilet_presence::PresenceService;

/// Shared dependencies passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The presence engine.
    pub service: Arc<PresenceService>,
}

impl AppState {
    /// Build the state around a presence service.
    pub fn new(service: Arc<PresenceService>) -> Self {
        Self { service }
    }
}
