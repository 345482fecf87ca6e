//! Periodic re-indexing of random primary-store samples.
//!
//! Each tick samples posts, users and unexpired stories independently and
//! upserts them into the search index. A failure while sampling or writing
//! skips the rest of that entity kind for the tick; the next tick draws a
//! fresh sample.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing;

use sidechain_core::config::ReconciliationConfig;
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{SearchIndex, SearchSource};
use sidechain_core::types::SearchDocument;

/// Outcome of one sweep tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Posts upserted.
    pub posts: u32,
    /// Users upserted.
    pub users: u32,
    /// Stories upserted.
    pub stories: u32,
    /// Entity kinds skipped after a failure.
    pub failed: Vec<String>,
}

/// Keeps the search index eventually consistent with the primary store.
#[derive(Debug)]
pub struct ReconciliationSweeper {
    source: Arc<dyn SearchSource>,
    index: Arc<dyn SearchIndex>,
    config: ReconciliationConfig,
}

impl ReconciliationSweeper {
    /// Create a sweeper over the given source and index
    pub fn new(
        config: ReconciliationConfig,
        source: Arc<dyn SearchSource>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            source,
            index,
            config,
        }
    }

    /// Run one sweep over every entity kind.
    pub async fn run_once(&self) -> SweepReport {
        let started = std::time::Instant::now();
        let mut report = SweepReport::default();

        match self
            .index_kind("posts", self.source.sample_posts(self.config.post_sample).await)
            .await
        {
            Some(count) => report.posts = count,
            None => report.failed.push("posts".to_string()),
        }
        match self
            .index_kind("users", self.source.sample_users(self.config.user_sample).await)
            .await
        {
            Some(count) => report.users = count,
            None => report.failed.push("users".to_string()),
        }
        match self
            .index_kind(
                "stories",
                self.source.sample_stories(self.config.story_sample).await,
            )
            .await
        {
            Some(count) => report.stories = count,
            None => report.failed.push("stories".to_string()),
        }

        tracing::info!(
            posts = report.posts,
            users = report.users,
            stories = report.stories,
            failed = ?report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search reconciliation sweep finished"
        );
        report
    }

    /// Upsert one sampled batch. `None` means the kind was skipped.
    async fn index_kind<D: SearchDocument>(
        &self,
        kind: &str,
        sample: AppResult<Vec<D>>,
    ) -> Option<u32> {
        let documents = match sample {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(kind, error = %e, "Sampling failed, skipping kind this tick");
                return None;
            }
        };

        let mut indexed = 0;
        for document in &documents {
            if let Err(e) = self.upsert(document).await {
                tracing::warn!(
                    kind,
                    id = %document.document_id(),
                    indexed,
                    error = %e,
                    "Index write failed, skipping rest of kind this tick"
                );
                return None;
            }
            indexed += 1;
        }
        Some(indexed)
    }

    async fn upsert<D: SearchDocument>(&self, document: &D) -> AppResult<()> {
        let body = serde_json::to_value(document).map_err(AppError::from)?;
        self.index
            .upsert(D::INDEX, &document.document_id(), body)
            .await
    }

    /// Tick every `interval_secs` until cancelled. Ticks never overlap; a
    /// tick that would start while the previous sweep is still running is
    /// skipped.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.config.run_on_start {
            // The first tick completes immediately.
            interval.tick().await;
        }

        tracing::info!(interval_secs = period.as_secs(), "Reconciliation sweeper started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
        tracing::info!("Reconciliation sweeper stopped");
    }
}
