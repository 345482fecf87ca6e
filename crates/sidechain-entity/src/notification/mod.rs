//! Notification preference rows and aggregated notification views.

pub mod group;
pub mod preference;

pub use group::{NotificationCounts, NotificationGroup, NotificationPage};
pub use preference::NotificationPreferenceRow;
