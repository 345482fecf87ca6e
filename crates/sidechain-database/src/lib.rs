//! # sidechain-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! relational implementations of the core store traits. The `memory`
//! feature adds process-local implementations used by tests and by
//! single-node development setups.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
