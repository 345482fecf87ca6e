//! User presence tracking with debounced offline transitions.

pub mod tracker;

pub use tracker::{PresenceTracker, StatusChange};
