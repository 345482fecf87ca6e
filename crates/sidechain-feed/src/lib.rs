//! # sidechain-feed
//!
//! Implementations of the durable notification feed used when a recipient
//! has no live connection. The hosted activity-feed service is reached over
//! HTTP; an in-memory store covers tests and single-node development.

pub mod manager;
pub mod providers;

pub use manager::build_feed_store;
