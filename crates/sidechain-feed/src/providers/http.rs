//! Hosted activity-feed service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use sidechain_core::config::FeedConfig;
use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::FeedStore;
use sidechain_core::types::{FeedActivity, NewActivity, NotificationFeed, PageRequest};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Feed store backed by the hosted activity-feed HTTP API.
///
/// Activities are written to `{base}/feeds/{group}/{user}/activities` with
/// the event ID as `foreign_id`, so the service collapses duplicates.
#[derive(Debug, Clone)]
pub struct HttpFeedStore {
    client: Client,
    base_url: String,
    api_key: String,
    feed_group: String,
}

#[derive(Debug, Deserialize)]
struct MarkResponse {
    #[serde(default)]
    updated: u64,
}

impl HttpFeedStore {
    /// Create a client from configuration.
    pub fn new(config: &FeedConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build feed HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            feed_group: config.notification_feed_group.clone(),
        })
    }

    fn feed_url(&self, recipient: Uuid, suffix: &str) -> String {
        format!(
            "{}/feeds/{}/{}/{}",
            self.base_url, self.feed_group, recipient, suffix
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> AppResult<reqwest::Response> {
        let response = self.authorized(request).send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, format!("Feed {what} failed"), e)
        })?;
        response.error_for_status().map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Feed {what} rejected"),
                e,
            )
        })
    }

    async fn mark(&self, recipient: Uuid, field: &str) -> AppResult<u64> {
        let request = self
            .client
            .post(self.feed_url(recipient, "mark"))
            .json(&serde_json::json!({ field: true }));
        let body: MarkResponse = self
            .send(request, "mark")
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Invalid feed mark response", e)
            })?;
        Ok(body.updated)
    }
}

#[async_trait]
impl FeedStore for HttpFeedStore {
    async fn add_activity(&self, recipient: Uuid, activity: NewActivity) -> AppResult<FeedActivity> {
        let body = serde_json::json!({
            "foreign_id": activity.id,
            "actor": activity.actor_id,
            "actor_name": activity.actor_name,
            "verb": activity.verb,
            "object": activity.object_id,
            "preview": activity.preview,
            "time": activity.created_at,
            "aggregation_key": activity.aggregation_key(),
        });
        let request = self
            .client
            .post(self.feed_url(recipient, "activities"))
            .json(&body);
        self.send(request, "write").await?;

        debug!(recipient = %recipient, activity_id = %activity.id, verb = %activity.verb, "Feed activity written");
        Ok(FeedActivity::from_new(activity))
    }

    async fn notifications(
        &self,
        recipient: Uuid,
        page: PageRequest,
    ) -> AppResult<NotificationFeed> {
        let page = page.normalized();
        let request = self
            .client
            .get(format!(
                "{}?limit={}&offset={}",
                self.feed_url(recipient, "activities"),
                page.limit(),
                page.offset()
            ));
        let mut feed: NotificationFeed =
            self.send(request, "read").await?.json().await.map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Invalid feed read response", e)
            })?;
        feed.activities.sort_by_key(|a| a.created_at);
        Ok(feed)
    }

    async fn mark_all_read(&self, recipient: Uuid) -> AppResult<u64> {
        self.mark(recipient, "mark_read").await
    }

    async fn mark_all_seen(&self, recipient: Uuid) -> AppResult<u64> {
        self.mark(recipient, "mark_seen").await
    }

    async fn health_check(&self) -> AppResult<bool> {
        let url = format!("{}/health", self.base_url);
        match self.authorized(self.client.get(url)).send().await {
            Ok(response) => Ok(response.status() == StatusCode::OK),
            Err(e) => Err(AppError::with_source(
                ErrorKind::ExternalService,
                "Feed health check failed",
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_uses_group_and_recipient() {
        let config = FeedConfig {
            base_url: "http://feeds.local/api/".into(),
            ..FeedConfig::default()
        };
        let store = HttpFeedStore::new(&config).unwrap();
        let user = Uuid::nil();
        assert_eq!(
            store.feed_url(user, "activities"),
            format!("http://feeds.local/api/feeds/notification/{user}/activities")
        );
    }
}
