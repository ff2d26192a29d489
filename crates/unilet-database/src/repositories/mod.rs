//! Repository implementations, one per owned table.

pub mod activity;
pub mod connection;
pub mod status;
