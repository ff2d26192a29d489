//! # unilet-api
//!
//! HTTP API layer for the Unilet presence service built on Axum.
//!
//! Exposes the read-side REST endpoints, the health probe, and the
//! WebSocket upgrade that feeds the presence engine.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
