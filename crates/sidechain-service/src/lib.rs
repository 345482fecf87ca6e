//! # sidechain-service
//!
//! Application services layered over the real-time engine and the feed
//! store: the aggregation presenter, notification listing with read/seen
//! state, preference updates and activity-status settings.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod activity;
pub mod cache_patch;
pub mod notification;
pub mod preferences;
pub mod presenter;

pub use activity::ActivityStatusService;
pub use cache_patch::patch_matching;
pub use notification::NotificationService;
pub use preferences::PreferenceService;
pub use presenter::{aggregate, display_text};
