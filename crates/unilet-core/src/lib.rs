//! # unilet-core
//!
//! Core crate for the Unilet presence service. Contains configuration
//! schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other Unilet crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
