//! # unilet-database
//!
//! PostgreSQL access layer. One repository per table owned by the
//! presence service: `user_statuses`, `active_connections`,
//! `user_activities`.

pub mod connection;
pub mod migration;
pub mod repositories;
