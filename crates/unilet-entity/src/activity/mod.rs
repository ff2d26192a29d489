//! User activity log entities.

pub mod model;

pub use model::{NewActivity, UserActivity};
