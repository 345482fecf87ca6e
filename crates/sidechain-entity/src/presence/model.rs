//! Presence state value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sidechain_core::types::{ActivitySettings, PresenceStatus};

/// The complete, unfiltered presence state for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceState {
    /// User ID.
    pub user_id: Uuid,
    /// Current status.
    pub status: PresenceStatus,
    /// Free-form status text set by the user.
    pub custom_status: Option<String>,
    /// DAW reported by the plugin while `in_studio`.
    pub daw: Option<String>,
    /// Last activity timestamp.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl PresenceState {
    /// An offline state with no history.
    pub fn offline(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            custom_status: None,
            daw: None,
            last_active_at: None,
        }
    }

    /// Apply the subject's visibility settings.
    ///
    /// Hidden activity status always reads as offline with nothing else
    /// disclosed. Hidden last-active keeps the real online flag but drops
    /// the timestamp.
    pub fn view_for(&self, settings: ActivitySettings) -> PresenceView {
        if !settings.show_activity_status {
            return PresenceView {
                user_id: self.user_id,
                is_online: false,
                status: PresenceStatus::Offline,
                custom_status: None,
                daw: None,
                last_active_at: None,
            };
        }
        PresenceView {
            user_id: self.user_id,
            is_online: self.status.is_online(),
            status: self.status,
            custom_status: self.custom_status.clone(),
            daw: self.daw.clone(),
            last_active_at: if settings.show_last_active {
                self.last_active_at
            } else {
                None
            },
        }
    }
}

/// Presence as disclosed to another user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceView {
    pub user_id: Uuid,
    pub is_online: bool,
    pub status: PresenceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
}

/// A followed user currently inside the DAW plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioFriend {
    pub user_id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online_state() -> PresenceState {
        PresenceState {
            user_id: Uuid::new_v4(),
            status: PresenceStatus::InStudio,
            custom_status: Some("mixing".into()),
            daw: Some("Reaper".into()),
            last_active_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_hidden_activity_reads_offline() {
        let view = online_state().view_for(ActivitySettings {
            show_activity_status: false,
            show_last_active: true,
        });
        assert!(!view.is_online);
        assert_eq!(view.status, PresenceStatus::Offline);
        assert!(view.custom_status.is_none());
        assert!(view.daw.is_none());
        assert!(view.last_active_at.is_none());
    }

    #[test]
    fn test_hidden_last_active_omits_field() {
        let view = online_state().view_for(ActivitySettings {
            show_activity_status: true,
            show_last_active: false,
        });
        assert!(view.is_online);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("last_active_at").is_none());
        assert_eq!(json["is_online"], true);
        assert_eq!(json["daw"], "Reaper");
    }
}
