//! Notification listing and read/seen state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use sidechain_cache::keys;
use sidechain_core::config::NotificationConfig;
use sidechain_core::result::AppResult;
use sidechain_core::traits::cache::CacheProviderExt;
use sidechain_core::traits::{CacheProvider, FeedStore};
use sidechain_core::types::PageRequest;
use sidechain_entity::notification::{NotificationCounts, NotificationGroup, NotificationPage};
use sidechain_realtime::{ConnectionRegistry, OutboundMessage};

use crate::cache_patch::patch_matching;
use crate::presenter::aggregate;

/// Serves aggregated notification pages and badge counters.
#[derive(Debug, Clone)]
pub struct NotificationService {
    feed: Arc<dyn FeedStore>,
    cache: Arc<dyn CacheProvider>,
    registry: Arc<ConnectionRegistry>,
    config: NotificationConfig,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        feed: Arc<dyn FeedStore>,
        cache: Arc<dyn CacheProvider>,
        registry: Arc<ConnectionRegistry>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            feed,
            cache,
            registry,
            config,
        }
    }

    fn page_ttl(&self) -> Duration {
        Duration::from_secs(self.config.page_cache_ttl_seconds)
    }

    /// One page of aggregated notifications, newest group first.
    pub async fn list(&self, user_id: Uuid, page: PageRequest) -> AppResult<NotificationPage> {
        let page = page.normalized();
        let key = keys::notification_page(user_id, page.page, page.page_size);

        match self.cache.get_json::<NotificationPage>(&key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Notification page cache read failed"),
        }

        let feed = self.feed.notifications(user_id, page).await?;
        let result = NotificationPage {
            groups: aggregate(&feed.activities),
            unread: feed.unread,
            unseen: feed.unseen,
            page: page.page,
            page_size: page.page_size,
            has_more: feed.has_more,
        };

        if let Err(e) = self.cache.set_json(&key, &result, self.page_ttl()).await {
            warn!(user_id = %user_id, error = %e, "Notification page cache write failed");
        }
        Ok(result)
    }

    /// Current badge counters straight from the feed store.
    pub async fn counts(&self, user_id: Uuid) -> AppResult<NotificationCounts> {
        let feed = self.feed.notifications(user_id, PageRequest::new(1, 1)).await?;
        Ok(NotificationCounts {
            unread: feed.unread,
            unseen: feed.unseen,
        })
    }

    /// Mark everything read (and therefore seen).
    pub async fn mark_read(&self, user_id: Uuid) -> AppResult<NotificationCounts> {
        let changed = self.feed.mark_all_read(user_id).await?;
        info!(user_id = %user_id, changed, "Notifications marked read");

        self.patch_cached_pages(
            user_id,
            |g| !g.is_read || !g.is_seen,
            |g| {
                g.is_read = true;
                g.is_seen = true;
            },
            |page| {
                page.unread = 0;
                page.unseen = 0;
            },
        )
        .await;
        self.refresh_counts(user_id).await
    }

    /// Mark everything seen; read state is untouched.
    pub async fn mark_seen(&self, user_id: Uuid) -> AppResult<NotificationCounts> {
        let changed = self.feed.mark_all_seen(user_id).await?;
        info!(user_id = %user_id, changed, "Notifications marked seen");

        self.patch_cached_pages(
            user_id,
            |g| !g.is_seen,
            |g| g.is_seen = true,
            |page| page.unseen = 0,
        )
        .await;
        self.refresh_counts(user_id).await
    }

    async fn refresh_counts(&self, user_id: Uuid) -> AppResult<NotificationCounts> {
        let counts = self.counts(user_id).await?;
        if self.config.push_count_updates {
            let pushed = self.registry.send(
                user_id,
                &OutboundMessage::NotificationCountUpdate {
                    unread: counts.unread,
                    unseen: counts.unseen,
                },
            );
            debug!(user_id = %user_id, pushed, "Count update pushed");
        }
        Ok(counts)
    }

    /// Rewrite every cached page of `user_id` in place so readers see the
    /// new flags before the entries expire.
    async fn patch_cached_pages<P, F, C>(&self, user_id: Uuid, predicate: P, transform: F, counters: C)
    where
        P: Fn(&NotificationGroup) -> bool,
        F: Fn(&mut NotificationGroup),
        C: Fn(&mut NotificationPage),
    {
        let keys = match self.cache.keys(&keys::notification_pages_pattern(user_id)).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Cannot list cached notification pages");
                return;
            }
        };

        for key in keys {
            let Ok(Some(mut page)) = self.cache.get_json::<NotificationPage>(&key).await else {
                continue;
            };
            let patched = patch_matching(&mut page.groups, &predicate, &transform);
            counters(&mut page);
            if let Err(e) = self.cache.set_json(&key, &page, self.page_ttl()).await {
                warn!(key = %key, error = %e, "Failed to patch cached notification page; dropping it");
                if let Err(e) = self.cache.delete(&key).await {
                    warn!(key = %key, error = %e, "Failed to drop unpatched notification page");
                }
            } else {
                debug!(key = %key, patched, "Patched cached notification page");
            }
        }
    }
}
