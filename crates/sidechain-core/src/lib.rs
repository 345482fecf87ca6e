//! # sidechain-core
//!
//! Core crate for the Sidechain realtime subsystem. Contains configuration
//! schemas, the closed set of domain events, notification categories,
//! shared value types, the collaborator traits implemented by the storage
//! and integration crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Sidechain crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
