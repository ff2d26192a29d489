//! Active connection entities.

pub mod model;

pub use model::ActiveConnection;
