//! Presence value objects.

pub mod model;

pub use model::{PresenceState, PresenceView, StudioFriend};
