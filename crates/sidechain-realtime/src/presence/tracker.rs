//! Presence tracker: online/offline state, custom status and visibility.
//!
//! A user comes online with their first connection. Losing the last
//! connection starts a grace timer; only when it fires with the registry
//! still empty does the user go offline. Reconnecting inside the window
//! cancels the timer, so page reloads do not flap.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sidechain_core::config::PresenceConfig;
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{ActivitySettingsStore, SocialGraph};
use sidechain_core::types::{ActivitySettings, PresenceStatus};
use sidechain_entity::presence::{PresenceState, PresenceView, StudioFriend};

use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;
use crate::message::validator::normalize_status_text;

/// Fields of a presence update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusChange<'a> {
    /// New status; `offline` is rejected.
    pub status: Option<PresenceStatus>,
    /// Custom status text; an empty string clears it.
    pub custom_status: Option<&'a str>,
    /// DAW name, ignored unless the resulting status is `in_studio`.
    pub daw: Option<&'a str>,
}

#[derive(Debug)]
struct PendingOffline {
    generation: u64,
    token: CancellationToken,
}

/// Tracks presence state for all users.
#[derive(Debug)]
pub struct PresenceTracker {
    registry: Arc<ConnectionRegistry>,
    social: Arc<dyn SocialGraph>,
    activity: Arc<dyn ActivitySettingsStore>,
    /// User ID → current state (absent means offline)
    states: DashMap<Uuid, PresenceState>,
    /// User ID → pending offline timer
    pending: DashMap<Uuid, PendingOffline>,
    generation: AtomicU64,
    shutdown: CancellationToken,
    config: PresenceConfig,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new(
        config: PresenceConfig,
        registry: Arc<ConnectionRegistry>,
        social: Arc<dyn SocialGraph>,
        activity: Arc<dyn ActivitySettingsStore>,
    ) -> Self {
        Self {
            registry,
            social,
            activity,
            states: DashMap::new(),
            pending: DashMap::new(),
            generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            config,
        }
    }

    /// Record that a user gained a connection.
    pub async fn connected(&self, user_id: Uuid) {
        if let Some((_, pending)) = self.pending.remove(&user_id) {
            pending.token.cancel();
            debug!(user_id = %user_id, "Reconnected within grace period");
        }

        let now = Utc::now();
        let came_online = {
            let mut state = self
                .states
                .entry(user_id)
                .or_insert_with(|| PresenceState::offline(user_id));
            let was_online = state.status.is_online();
            if !was_online {
                state.status = PresenceStatus::Online;
            }
            state.last_active_at = Some(now);
            !was_online
        };

        if came_online {
            info!(user_id = %user_id, "User online");
            self.persist(user_id, true, now).await;
            self.publish(user_id).await;
        }
    }

    /// Start the offline grace timer if the user has no live connection left.
    pub fn schedule_offline(self: &Arc<Self>, user_id: Uuid) {
        if self.registry.is_online(&user_id) || !self.is_online(user_id) {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shutdown.child_token();
        if let Some(previous) = self.pending.insert(
            user_id,
            PendingOffline {
                generation,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
        }

        let grace = Duration::from_millis(self.config.offline_grace_ms);
        debug!(user_id = %user_id, grace_ms = self.config.offline_grace_ms, "Offline grace timer started");

        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(grace) => {}
            }
            let ours = tracker
                .pending
                .remove_if(&user_id, |_, p| p.generation == generation)
                .is_some();
            if ours {
                tracker.expire(user_id).await;
            }
        });
    }

    /// Grace period elapsed: go offline unless a connection reappeared.
    async fn expire(&self, user_id: Uuid) {
        if self.registry.is_online(&user_id) {
            return;
        }

        let now = Utc::now();
        let went_offline = match self.states.get_mut(&user_id) {
            Some(mut state) if state.status.is_online() => {
                state.status = PresenceStatus::Offline;
                state.custom_status = None;
                state.daw = None;
                state.last_active_at = Some(now);
                true
            }
            _ => false,
        };

        if went_offline {
            info!(user_id = %user_id, "User offline");
            self.persist(user_id, false, now).await;
            self.publish(user_id).await;
        }
    }

    /// Online → Online refresh from a heartbeat or ping.
    pub fn heartbeat(&self, user_id: Uuid) {
        if let Some(mut state) = self.states.get_mut(&user_id) {
            state.last_active_at = Some(Utc::now());
        }
    }

    /// Apply a status change. Setting a status requires a live connection;
    /// `offline` can never be set directly.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        change: StatusChange<'_>,
    ) -> AppResult<PresenceState> {
        if change.status == Some(PresenceStatus::Offline) {
            return Err(AppError::validation(
                "Status 'offline' is derived from connections and cannot be set",
            ));
        }
        if change.status.is_some() && !self.is_online(user_id) {
            return Err(AppError::validation("Status can only be set while connected"));
        }

        let max = self.config.max_status_length;
        let updated = {
            let mut state = self
                .states
                .entry(user_id)
                .or_insert_with(|| PresenceState::offline(user_id));
            if let Some(status) = change.status {
                state.status = status;
                if status != PresenceStatus::InStudio {
                    state.daw = None;
                }
            }
            if let Some(text) = change.custom_status {
                state.custom_status = normalize_status_text(text, max);
            }
            if let Some(daw) = change.daw.filter(|_| state.status == PresenceStatus::InStudio) {
                state.daw = normalize_status_text(daw, max);
            }
            state.clone()
        };

        debug!(user_id = %user_id, status = %updated.status, daw = ?updated.daw, "Presence status updated");
        self.publish(user_id).await;
        Ok(updated)
    }

    /// Set or clear the custom status text without touching online state.
    pub async fn set_custom_status(
        &self,
        user_id: Uuid,
        text: Option<&str>,
    ) -> AppResult<PresenceState> {
        self.update_status(
            user_id,
            StatusChange {
                custom_status: Some(text.unwrap_or_default()),
                ..StatusChange::default()
            },
        )
        .await
    }

    /// The unfiltered in-memory state.
    pub fn state(&self, user_id: Uuid) -> PresenceState {
        self.states
            .get(&user_id)
            .map(|s| s.value().clone())
            .unwrap_or_else(|| PresenceState::offline(user_id))
    }

    /// Whether the tracker reports the user online.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.states
            .get(&user_id)
            .is_some_and(|s| s.status.is_online())
    }

    /// Presence of `subject` as disclosed to `viewer`.
    pub async fn presence_for(&self, viewer: Uuid, subject: Uuid) -> AppResult<PresenceView> {
        let mut state = self.state(subject);
        if state.last_active_at.is_none() {
            state.last_active_at = self.activity.last_active(subject).await?;
        }
        if viewer == subject {
            return Ok(state.view_for(ActivitySettings::default()));
        }
        let settings = self.activity.settings(subject).await?;
        Ok(state.view_for(settings))
    }

    /// Presence of each subject as disclosed to `viewer`, in request order
    /// with duplicates removed.
    pub async fn presence_many(
        &self,
        viewer: Uuid,
        subjects: &[Uuid],
    ) -> AppResult<Vec<PresenceView>> {
        let mut seen = HashSet::new();
        let mut views = Vec::with_capacity(subjects.len());
        for subject in subjects.iter().filter(|s| seen.insert(**s)) {
            views.push(self.presence_for(viewer, *subject).await?);
        }
        Ok(views)
    }

    /// Users `viewer` follows who are in the studio right now. Users hiding
    /// their activity status are left out.
    pub async fn friends_in_studio(&self, viewer: Uuid) -> AppResult<Vec<StudioFriend>> {
        let mut friends = Vec::new();
        for followee in self.social.following(viewer).await? {
            let state = self.state(followee);
            if state.status != PresenceStatus::InStudio {
                continue;
            }
            if !self.activity.settings(followee).await?.show_activity_status {
                continue;
            }
            let username = self
                .registry
                .user_connections(&followee)
                .first()
                .map(|c| c.username.clone())
                .unwrap_or_default();
            friends.push(StudioFriend {
                user_id: followee,
                username,
                daw: state.daw,
                custom_status: state.custom_status,
            });
        }
        Ok(friends)
    }

    /// Broadcast the user's presence to connected followers, unless the
    /// user hides their activity status.
    pub async fn publish(&self, user_id: Uuid) -> usize {
        let settings = match self.activity.settings(user_id).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Visibility lookup failed, not broadcasting presence");
                return 0;
            }
        };
        if !settings.show_activity_status {
            return 0;
        }
        self.broadcast_view(user_id, self.state(user_id).view_for(settings))
            .await
    }

    /// Broadcast after a visibility change. Hidden users are announced as
    /// offline so followers drop the stale indicator.
    pub async fn republish(&self, user_id: Uuid, settings: ActivitySettings) -> usize {
        self.broadcast_view(user_id, self.state(user_id).view_for(settings))
            .await
    }

    async fn broadcast_view(&self, user_id: Uuid, view: PresenceView) -> usize {
        let followers: HashSet<Uuid> = match self.social.followers(user_id).await {
            Ok(followers) => followers.into_iter().collect(),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Follower lookup failed, not broadcasting presence");
                return 0;
            }
        };
        if followers.is_empty() {
            return 0;
        }
        self.registry.broadcast(
            |u| followers.contains(&u),
            &OutboundMessage::PresenceChanged(view),
        )
    }

    async fn persist(&self, user_id: Uuid, is_online: bool, at: DateTime<Utc>) {
        if let Err(e) = self.activity.record_presence(user_id, is_online, at).await {
            warn!(user_id = %user_id, is_online, error = %e, "Failed to persist presence");
        }
    }

    /// Number of pending offline timers.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every pending offline timer.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.clear();
    }
}
