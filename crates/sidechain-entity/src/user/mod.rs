//! User rows.

pub mod model;

pub use model::{UserActivityRow, UserRow};
