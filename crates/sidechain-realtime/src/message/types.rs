//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is `{"type": ..., "payload": {...}}`. Outbound frames also
//! carry a `timestamp`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use sidechain_core::error::AppError;
use sidechain_core::events::{Actor, DomainEvent, EventPayload};
use sidechain_core::result::AppResult;
use sidechain_core::types::PresenceStatus;
use sidechain_entity::presence::PresenceView;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Application-level ping; answered with `pong`.
    Ping {
        /// Client clock in milliseconds, echoed back.
        client_time: Option<i64>,
    },
    /// Keep-alive without a reply.
    Heartbeat,
    /// Change status and/or custom status text.
    PresenceUpdate {
        /// New status; only `online` and `in_studio` are accepted.
        status: Option<PresenceStatus>,
        /// New status text. An empty string clears it; absent leaves it.
        custom_status: Option<String>,
        /// DAW the plugin runs in; kept only while `in_studio`.
        daw: Option<String>,
    },
    /// The user started typing a comment on a post.
    TypingStart {
        /// The post being commented on.
        post_id: Uuid,
    },
    /// The user stopped typing.
    TypingStop {
        /// The post being commented on.
        post_id: Uuid,
    },
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Default, Deserialize)]
struct PingPayload {
    #[serde(default)]
    client_time: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct PresencePayload {
    #[serde(default)]
    status: Option<PresenceStatus>,
    #[serde(default)]
    custom_status: Option<String>,
    #[serde(default)]
    daw: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypingPayload {
    post_id: Uuid,
}

fn payload<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> AppResult<T> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value)
        .map_err(|e| AppError::validation(format!("Invalid '{kind}' payload: {e}")))
}

impl InboundMessage {
    /// Parse a text frame. A missing `payload` is treated as `{}`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let frame: RawFrame = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Malformed message: {e}")))?;

        match frame.kind.as_str() {
            "ping" => {
                let p: PingPayload = payload(&frame.kind, frame.payload)?;
                Ok(Self::Ping {
                    client_time: p.client_time,
                })
            }
            "heartbeat" => Ok(Self::Heartbeat),
            "presence_update" => {
                let p: PresencePayload = payload(&frame.kind, frame.payload)?;
                Ok(Self::PresenceUpdate {
                    status: p.status,
                    custom_status: p.custom_status,
                    daw: p.daw,
                })
            }
            "typing_start" => {
                let p: TypingPayload = payload(&frame.kind, frame.payload)?;
                Ok(Self::TypingStart { post_id: p.post_id })
            }
            "typing_stop" => {
                let p: TypingPayload = payload(&frame.kind, frame.payload)?;
                Ok(Self::TypingStop { post_id: p.post_id })
            }
            other => Err(AppError::validation(format!(
                "Unknown message type: '{other}'"
            ))),
        }
    }
}

/// A domain event as pushed to a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNotice {
    /// Event ID; clients deduplicate on it.
    pub event_id: Uuid,
    /// Who caused the event.
    pub actor: Actor,
    /// When it happened.
    pub created_at: DateTime<Utc>,
    /// Kind-specific fields, tagged with `kind`.
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Server lifecycle notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    /// Sent once after registration.
    Connected,
    /// Sent to every connection before the server closes it.
    ServerShutdown,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Someone the recipient follows published a post.
    NewPost(EventNotice),
    /// The recipient's post was liked.
    PostLiked(EventNotice),
    /// The recipient's post received a comment.
    PostCommented(EventNotice),
    /// The recipient's post was saved.
    PostSaved(EventNotice),
    /// Someone followed the recipient.
    UserFollowed(EventNotice),
    /// The recipient was mentioned.
    Mentioned(EventNotice),
    /// The recipient's post was reposted.
    PostReposted(EventNotice),
    /// A direct message arrived.
    DirectMessage(EventNotice),
    /// Someone the recipient follows posted a story.
    StoryPosted(EventNotice),
    /// Someone entered the recipient's challenge.
    ChallengeEntered(EventNotice),
    /// A followed user's presence changed.
    PresenceChanged(PresenceView),
    /// A followed user started typing on a post.
    UserTyping {
        /// The typist.
        user_id: Uuid,
        /// The post.
        post_id: Uuid,
    },
    /// A followed user stopped typing.
    UserStopTyping {
        /// The typist.
        user_id: Uuid,
        /// The post.
        post_id: Uuid,
    },
    /// Badge counters changed.
    NotificationCountUpdate {
        /// Unread activities.
        unread: u64,
        /// Unseen activities.
        unseen: u64,
    },
    /// Reply to an inbound `ping`.
    Pong {
        /// The client's clock, echoed.
        client_time: Option<i64>,
        /// Server clock in milliseconds.
        server_time: i64,
    },
    /// A request could not be processed. The connection stays open.
    Error {
        /// Machine-readable code.
        code: String,
        /// Description.
        message: String,
    },
    /// Server lifecycle notice.
    System {
        /// What happened.
        event: SystemEvent,
    },
}

#[derive(Serialize)]
struct Frame<'a> {
    #[serde(flatten)]
    message: &'a OutboundMessage,
    timestamp: DateTime<Utc>,
}

impl OutboundMessage {
    /// Render a domain event for delivery.
    pub fn from_event(event: &DomainEvent) -> Self {
        let notice = EventNotice {
            event_id: event.id,
            actor: event.actor.clone(),
            created_at: event.timestamp,
            payload: event.payload.clone(),
        };
        match event.payload {
            EventPayload::PostLiked { .. } => Self::PostLiked(notice),
            EventPayload::PostCommented { .. } => Self::PostCommented(notice),
            EventPayload::PostSaved { .. } => Self::PostSaved(notice),
            EventPayload::NewPost { .. } => Self::NewPost(notice),
            EventPayload::UserFollowed { .. } => Self::UserFollowed(notice),
            EventPayload::Mentioned { .. } => Self::Mentioned(notice),
            EventPayload::PostReposted { .. } => Self::PostReposted(notice),
            EventPayload::DirectMessage { .. } => Self::DirectMessage(notice),
            EventPayload::StoryPosted { .. } => Self::StoryPosted(notice),
            EventPayload::ChallengeEntered { .. } => Self::ChallengeEntered(notice),
        }
    }

    /// Build an error reply.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build an error reply from an application error.
    pub fn from_error(err: &AppError) -> Self {
        Self::error(err.kind.to_string().to_ascii_lowercase(), err.message.clone())
    }

    /// Serialize to a wire frame with the current timestamp.
    pub fn to_frame(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&Frame {
            message: self,
            timestamp: Utc::now(),
        })?)
    }
}
