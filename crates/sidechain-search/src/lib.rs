//! # sidechain-search
//!
//! Document-level access to the full-text search index that the
//! reconciliation sweeper keeps in line with the primary store.

pub mod manager;
pub mod providers;

pub use manager::build_search_index;
