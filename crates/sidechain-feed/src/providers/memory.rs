//! Process-local notification feeds.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::FeedStore;
use sidechain_core::types::{FeedActivity, NewActivity, NotificationFeed, PageRequest};

/// In-memory feed store. Each recipient's activities are kept oldest first.
#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    feeds: DashMap<Uuid, Vec<FeedActivity>>,
    writes: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryFeedStore {
    /// An empty feed store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted `add_activity` calls, duplicates included.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Every stored activity for a recipient, oldest first.
    pub fn activities(&self, recipient: Uuid) -> Vec<FeedActivity> {
        self.feeds
            .get(&recipient)
            .map(|f| f.value().clone())
            .unwrap_or_default()
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Feed store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn add_activity(&self, recipient: Uuid, activity: NewActivity) -> AppResult<FeedActivity> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut feed = self.feeds.entry(recipient).or_default();
        if let Some(existing) = feed.iter().find(|a| a.id == activity.id) {
            return Ok(existing.clone());
        }
        let stored = FeedActivity::from_new(activity);
        feed.push(stored.clone());
        feed.sort_by_key(|a| a.created_at);
        Ok(stored)
    }

    async fn notifications(
        &self,
        recipient: Uuid,
        page: PageRequest,
    ) -> AppResult<NotificationFeed> {
        self.check()?;
        let Some(feed) = self.feeds.get(&recipient) else {
            return Ok(NotificationFeed::default());
        };

        let page = page.normalized();
        let total = feed.len() as u64;
        let end = total.saturating_sub(page.offset()) as usize;
        let start = end.saturating_sub(page.limit() as usize);

        Ok(NotificationFeed {
            activities: feed[start..end].to_vec(),
            unread: feed.iter().filter(|a| !a.is_read).count() as u64,
            unseen: feed.iter().filter(|a| !a.is_seen).count() as u64,
            has_more: start > 0,
        })
    }

    async fn mark_all_read(&self, recipient: Uuid) -> AppResult<u64> {
        self.check()?;
        let mut changed = 0;
        if let Some(mut feed) = self.feeds.get_mut(&recipient) {
            for activity in feed.iter_mut().filter(|a| !a.is_read) {
                activity.is_read = true;
                activity.is_seen = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn mark_all_seen(&self, recipient: Uuid) -> AppResult<u64> {
        self.check()?;
        let mut changed = 0;
        if let Some(mut feed) = self.feeds.get_mut(&recipient) {
            for activity in feed.iter_mut().filter(|a| !a.is_seen) {
                activity.is_seen = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
