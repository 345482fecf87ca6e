//! Elasticsearch document API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use sidechain_core::config::SearchConfig;
use sidechain_core::error::{AppError, ErrorKind};
use sidechain_core::result::AppResult;
use sidechain_core::traits::SearchIndex;

/// Search index backed by Elasticsearch's `_doc` endpoints.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

impl ElasticsearchIndex {
    /// Create a client from configuration.
    pub fn new(config: &SearchConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build search HTTP client",
                    e,
                )
            })?;

        let credentials = (!config.username.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn doc_url(&self, index: &str, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, index, id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> AppResult<reqwest::Response> {
        self.authorized(request).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Search {what} failed"),
                e,
            )
        })
    }

    fn rejected(status: StatusCode, what: &str) -> AppError {
        AppError::external_service(format!("Search {what} rejected with status {status}"))
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn upsert(&self, index: &str, id: &str, document: Value) -> AppResult<()> {
        let response = self
            .send(self.client.put(self.doc_url(index, id)).json(&document), "upsert")
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response.status(), "upsert"));
        }
        debug!(index, id, "Search document indexed");
        Ok(())
    }

    async fn delete(&self, index: &str, id: &str) -> AppResult<()> {
        let response = self
            .send(self.client.delete(self.doc_url(index, id)), "delete")
            .await?;
        match response.status() {
            s if s.is_success() || s == StatusCode::NOT_FOUND => Ok(()),
            s => Err(Self::rejected(s, "delete")),
        }
    }

    async fn get(&self, index: &str, id: &str) -> AppResult<Option<Value>> {
        let response = self
            .send(self.client.get(self.doc_url(index, id)), "get")
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body: GetResponse = response.json().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::ExternalService,
                        "Invalid search get response",
                        e,
                    )
                })?;
                Ok(body.found.then_some(body.source).flatten())
            }
            s => Err(Self::rejected(s, "get")),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        let url = format!("{}/_cluster/health", self.base_url);
        let response = self.send(self.client.get(url), "health check").await?;
        Ok(response.status().is_success())
    }
}
