//! # unilet-presence
//!
//! The real-time presence and activity tracking engine. A long-lived
//! [`service::PresenceService`] accepts frames from many concurrent
//! WebSocket connections, maintains per-connection liveness via
//! heartbeats, reconciles the in-memory connection registry with durable
//! storage, and fans status changes out to connected parties.
//!
//! The transport layer (see `unilet-api`) owns the sockets; this crate
//! owns everything behind them.

pub mod broadcast;
pub mod dispatcher;
pub mod frames;
pub mod heartbeat;
pub mod registry;
pub mod service;
pub mod store;
pub mod verify;

pub use service::PresenceService;
