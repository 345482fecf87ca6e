//! Core type definitions used across the Sidechain workspace.

pub mod feed;
pub mod pagination;
pub mod preferences;
pub mod presence;
pub mod search;

pub use feed::{FeedActivity, NewActivity, NotificationFeed, aggregation_key};
pub use pagination::PageRequest;
pub use preferences::NotificationPreferences;
pub use presence::{ActivitySettings, PresenceStatus};
pub use search::{PostDocument, SearchDocument, StoryDocument, UserDocument};
