//! Presence value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reported presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// At least one live connection.
    Online,
    /// Online and inside the DAW plugin.
    InStudio,
    /// No live connection.
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Whether this status counts as online.
    pub fn is_online(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::InStudio => write!(f, "in_studio"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// A user's activity-status visibility settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySettings {
    /// Whether others may see the user as online at all.
    pub show_activity_status: bool,
    /// Whether others may see when the user was last active.
    pub show_last_active: bool,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            show_activity_status: true,
            show_last_active: true,
        }
    }
}
