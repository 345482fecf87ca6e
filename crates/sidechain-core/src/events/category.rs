//! Notification categories used by the preference gate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A user-toggleable class of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Someone liked one of the user's posts.
    Likes,
    /// Someone commented on one of the user's posts.
    Comments,
    /// Someone followed the user.
    Follows,
    /// Someone mentioned the user.
    Mentions,
    /// A direct message arrived.
    Dms,
    /// A followed user posted a story.
    Stories,
    /// Someone reposted one of the user's posts.
    Reposts,
    /// Activity on a challenge the user runs or entered.
    Challenges,
    /// Someone saved one of the user's posts.
    Saves,
    /// A followed user published a new post.
    Posts,
}

impl NotificationCategory {
    /// Every known category, in display order.
    pub const ALL: [NotificationCategory; 10] = [
        Self::Likes,
        Self::Comments,
        Self::Follows,
        Self::Mentions,
        Self::Dms,
        Self::Stories,
        Self::Reposts,
        Self::Challenges,
        Self::Saves,
        Self::Posts,
    ];

    /// The wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Follows => "follows",
            Self::Mentions => "mentions",
            Self::Dms => "dms",
            Self::Stories => "stories",
            Self::Reposts => "reposts",
            Self::Challenges => "challenges",
            Self::Saves => "saves",
            Self::Posts => "posts",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown notification category: '{s}'")))
    }
}
