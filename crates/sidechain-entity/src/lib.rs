//! # sidechain-entity
//!
//! Entity models for Sidechain. Row structs mirror the primary-store
//! tables this subsystem reads and derive `sqlx::FromRow`; value objects
//! describe in-memory presence state.

pub mod notification;
pub mod post;
pub mod presence;
pub mod story;
pub mod user;
