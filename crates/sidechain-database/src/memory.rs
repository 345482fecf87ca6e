//! Process-local store implementations.
//!
//! These back the same traits as the PostgreSQL repositories and are used by
//! tests and by development setups without a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{ActivitySettingsStore, PreferenceStore, SearchSource, SocialGraph};
use sidechain_core::types::{
    ActivitySettings, NotificationPreferences, PostDocument, StoryDocument, UserDocument,
};

/// Simulated outage switch shared by the in-memory stores.
#[derive(Debug, Default)]
struct Outage(AtomicBool);

impl Outage {
    fn check(&self, what: &str) -> AppResult<()> {
        if self.0.load(Ordering::SeqCst) {
            return Err(AppError::database(format!("{what} unavailable")));
        }
        Ok(())
    }
}

// ── Social graph ───────────────────────────────────────────

/// In-memory follow/mute/block relationships.
#[derive(Debug, Default)]
pub struct InMemorySocialGraph {
    /// followee → followers
    followers: DashMap<Uuid, HashSet<Uuid>>,
    /// (user, muted)
    mutes: DashMap<(Uuid, Uuid), ()>,
    /// (blocker, blocked)
    blocks: DashMap<(Uuid, Uuid), ()>,
    outage: Outage,
}

impl InMemorySocialGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `follower` follows `followee`.
    pub fn follow(&self, follower: Uuid, followee: Uuid) {
        self.followers.entry(followee).or_default().insert(follower);
    }

    /// Record that `user` muted `muted`.
    pub fn mute(&self, user: Uuid, muted: Uuid) {
        self.mutes.insert((user, muted), ());
    }

    /// Record that `blocker` blocked `blocked`.
    pub fn block(&self, blocker: Uuid, blocked: Uuid) {
        self.blocks.insert((blocker, blocked), ());
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.outage.0.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl SocialGraph for InMemorySocialGraph {
    async fn followers(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.outage.check("social graph")?;
        Ok(self
            .followers
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn following(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        self.outage.check("social graph")?;
        Ok(self
            .followers
            .iter()
            .filter(|entry| entry.value().contains(&user_id))
            .map(|entry| *entry.key())
            .collect())
    }

    async fn is_suppressed(&self, recipient: Uuid, actor: Uuid) -> AppResult<bool> {
        self.outage.check("social graph")?;
        Ok(self.mutes.contains_key(&(recipient, actor))
            || self.blocks.contains_key(&(recipient, actor))
            || self.blocks.contains_key(&(actor, recipient)))
    }
}

// ── Preferences ────────────────────────────────────────────

/// In-memory preference rows.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    rows: DashMap<Uuid, NotificationPreferences>,
    outage: Outage,
}

impl InMemoryPreferenceStore {
    /// A store with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a row exists for the user.
    pub fn has_row(&self, user_id: Uuid) -> bool {
        self.rows.contains_key(&user_id)
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.outage.0.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load(&self, user_id: Uuid) -> AppResult<Option<NotificationPreferences>> {
        self.outage.check("preference store")?;
        Ok(self.rows.get(&user_id).map(|r| r.value().clone()))
    }

    async fn save(&self, user_id: Uuid, preferences: &NotificationPreferences) -> AppResult<()> {
        self.outage.check("preference store")?;
        self.rows.insert(user_id, preferences.clone());
        Ok(())
    }
}

// ── Activity settings ──────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct ActivityRow {
    settings: ActivitySettings,
    is_online: bool,
    last_active_at: Option<DateTime<Utc>>,
}

/// In-memory visibility settings and presence columns.
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    rows: DashMap<Uuid, ActivityRow>,
    outage: Outage,
}

impl InMemoryActivityStore {
    /// A store with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last persisted online flag.
    pub fn persisted_online(&self, user_id: Uuid) -> Option<bool> {
        self.rows.get(&user_id).map(|r| r.is_online)
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.outage.0.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActivitySettingsStore for InMemoryActivityStore {
    async fn settings(&self, user_id: Uuid) -> AppResult<ActivitySettings> {
        self.outage.check("activity store")?;
        Ok(self
            .rows
            .get(&user_id)
            .map(|r| r.settings)
            .unwrap_or_default())
    }

    async fn update_settings(&self, user_id: Uuid, settings: ActivitySettings) -> AppResult<()> {
        self.outage.check("activity store")?;
        self.rows.entry(user_id).or_default().settings = settings;
        Ok(())
    }

    async fn record_presence(
        &self,
        user_id: Uuid,
        is_online: bool,
        last_active_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.outage.check("activity store")?;
        let mut row = self.rows.entry(user_id).or_default();
        row.is_online = is_online;
        row.last_active_at = Some(last_active_at);
        Ok(())
    }

    async fn last_active(&self, user_id: Uuid) -> AppResult<Option<DateTime<Utc>>> {
        self.outage.check("activity store")?;
        Ok(self.rows.get(&user_id).and_then(|r| r.last_active_at))
    }
}

// ── Search source ──────────────────────────────────────────

/// In-memory primary-store rows for reconciliation.
#[derive(Debug, Default)]
pub struct InMemorySearchSource {
    posts: DashMap<Uuid, PostDocument>,
    users: DashMap<Uuid, UserDocument>,
    stories: DashMap<Uuid, StoryDocument>,
    outage: Outage,
}

impl InMemorySearchSource {
    /// A source with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_post(&self, post: PostDocument) {
        self.posts.insert(post.id, post);
    }

    pub fn put_user(&self, user: UserDocument) {
        self.users.insert(user.id, user);
    }

    pub fn put_story(&self, story: StoryDocument) {
        self.stories.insert(story.id, story);
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.outage.0.store(unavailable, Ordering::SeqCst);
    }
}

/// Shuffle by sorting on fresh random v4 keys, then truncate.
fn sample<T: Clone>(items: impl Iterator<Item = T>, limit: u32) -> Vec<T> {
    let mut keyed: Vec<(Uuid, T)> = items.map(|item| (Uuid::new_v4(), item)).collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed
        .into_iter()
        .take(limit as usize)
        .map(|(_, item)| item)
        .collect()
}

#[async_trait]
impl SearchSource for InMemorySearchSource {
    async fn sample_posts(&self, limit: u32) -> AppResult<Vec<PostDocument>> {
        self.outage.check("search source")?;
        Ok(sample(self.posts.iter().map(|e| e.value().clone()), limit))
    }

    async fn sample_users(&self, limit: u32) -> AppResult<Vec<UserDocument>> {
        self.outage.check("search source")?;
        Ok(sample(self.users.iter().map(|e| e.value().clone()), limit))
    }

    async fn sample_stories(&self, limit: u32) -> AppResult<Vec<StoryDocument>> {
        self.outage.check("search source")?;
        let now = Utc::now();
        Ok(sample(
            self.stories
                .iter()
                .filter(|e| e.value().expires_at > now)
                .map(|e| e.value().clone()),
            limit,
        ))
    }
}
