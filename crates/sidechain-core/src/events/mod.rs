//! Domain events consumed by the fan-out router.
//!
//! Events are produced by the CRUD services (likes, comments, follows, ...)
//! and posted to the internal ingress route. Each kind carries typed fields;
//! JSON only appears at the boundary.

pub mod category;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use category::NotificationCategory;

/// The user who caused an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor user ID.
    pub id: Uuid,
    /// Display name at the time of the action. May be empty.
    #[serde(default)]
    pub name: String,
}

/// Wrapper for a domain event with routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID, used by clients to deduplicate.
    #[serde(default = "Uuid::now_v7")]
    pub id: Uuid,
    /// When the event occurred.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Who caused it.
    pub actor: Actor,
    /// Explicit recipients. Empty means "the actor's followers" for
    /// broadcast-style kinds and nobody otherwise.
    #[serde(default)]
    pub recipients: Vec<Uuid>,
    /// The typed payload.
    pub payload: EventPayload,
}

/// Closed set of event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A post was liked (optionally with an emoji reaction).
    PostLiked {
        /// The liked post.
        post_id: Uuid,
        /// Emoji reaction, if any.
        #[serde(default)]
        emoji: Option<String>,
    },
    /// A comment was added to a post.
    PostCommented {
        /// The commented post.
        post_id: Uuid,
        /// The new comment.
        comment_id: Uuid,
        /// Comment text.
        preview: String,
    },
    /// A post was saved to a collection.
    PostSaved {
        /// The saved post.
        post_id: Uuid,
    },
    /// A followed user published a post.
    NewPost {
        /// The new post.
        post_id: Uuid,
        /// Post title, if any.
        #[serde(default)]
        title: Option<String>,
    },
    /// A user followed another.
    UserFollowed {
        /// The user being followed.
        followee_id: Uuid,
    },
    /// A user was @-mentioned.
    Mentioned {
        /// The post containing the mention.
        post_id: Uuid,
        /// The comment containing the mention, if any.
        #[serde(default)]
        comment_id: Option<Uuid>,
        /// Text surrounding the mention.
        preview: String,
    },
    /// A post was reposted.
    PostReposted {
        /// The original post.
        post_id: Uuid,
        /// The repost.
        repost_id: Uuid,
    },
    /// A direct message was sent.
    DirectMessage {
        /// The conversation.
        conversation_id: Uuid,
        /// Message text.
        preview: String,
    },
    /// A followed user posted a story.
    StoryPosted {
        /// The story.
        story_id: Uuid,
    },
    /// A user entered a challenge.
    ChallengeEntered {
        /// The challenge.
        challenge_id: Uuid,
        /// The entry post.
        entry_id: Uuid,
    },
}

impl EventPayload {
    /// The preference category gating this event.
    pub fn category(&self) -> NotificationCategory {
        match self {
            Self::PostLiked { .. } => NotificationCategory::Likes,
            Self::PostCommented { .. } => NotificationCategory::Comments,
            Self::PostSaved { .. } => NotificationCategory::Saves,
            Self::NewPost { .. } => NotificationCategory::Posts,
            Self::UserFollowed { .. } => NotificationCategory::Follows,
            Self::Mentioned { .. } => NotificationCategory::Mentions,
            Self::PostReposted { .. } => NotificationCategory::Reposts,
            Self::DirectMessage { .. } => NotificationCategory::Dms,
            Self::StoryPosted { .. } => NotificationCategory::Stories,
            Self::ChallengeEntered { .. } => NotificationCategory::Challenges,
        }
    }

    /// The notification-feed verb, if this kind is kept in the durable
    /// notification feed. Kinds without a verb are live-only.
    pub fn feed_verb(&self) -> Option<&'static str> {
        match self {
            Self::PostLiked { .. } => Some("like"),
            Self::PostCommented { .. } => Some("comment"),
            Self::UserFollowed { .. } => Some("follow"),
            Self::Mentioned { .. } => Some("mention"),
            Self::PostReposted { .. } => Some("repost"),
            Self::PostSaved { .. } => Some("save"),
            Self::ChallengeEntered { .. } => Some("challenge_entry"),
            Self::NewPost { .. } | Self::DirectMessage { .. } | Self::StoryPosted { .. } => None,
        }
    }

    /// The object the event is about.
    pub fn object_id(&self) -> Uuid {
        match self {
            Self::PostLiked { post_id, .. }
            | Self::PostCommented { post_id, .. }
            | Self::PostSaved { post_id }
            | Self::NewPost { post_id, .. }
            | Self::Mentioned { post_id, .. }
            | Self::PostReposted { post_id, .. } => *post_id,
            Self::UserFollowed { followee_id } => *followee_id,
            Self::DirectMessage {
                conversation_id, ..
            } => *conversation_id,
            Self::StoryPosted { story_id } => *story_id,
            Self::ChallengeEntered { challenge_id, .. } => *challenge_id,
        }
    }

    /// Free text attached to the event (comment, mention or message body).
    pub fn preview(&self) -> Option<&str> {
        match self {
            Self::PostCommented { preview, .. }
            | Self::Mentioned { preview, .. }
            | Self::DirectMessage { preview, .. } => Some(preview.as_str()),
            _ => None,
        }
    }

    /// Whether an empty recipient list means "all of the actor's followers".
    pub fn targets_followers(&self) -> bool {
        matches!(self, Self::NewPost { .. } | Self::StoryPosted { .. })
    }
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor: Actor, recipients: Vec<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor,
            recipients,
            payload,
        }
    }

    /// Shortcut for [`EventPayload::category`].
    pub fn category(&self) -> NotificationCategory {
        self.payload.category()
    }
}
