//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sidechain_api::{AppState, Backends, build_app, build_state};
use sidechain_auth::JwtEncoder;
use sidechain_cache::CacheManager;
use sidechain_core::config::AppConfig;
use sidechain_database::connection::Stores;
use sidechain_database::memory::{
    InMemoryActivityStore, InMemoryPreferenceStore, InMemorySearchSource, InMemorySocialGraph,
};
use sidechain_feed::providers::InMemoryFeedStore;
use sidechain_search::providers::InMemorySearchIndex;

pub const INTERNAL_TOKEN: &str = "test-internal-token";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving the engine directly
    pub state: AppState,
    /// Follow/mute/block fixtures
    pub social: Arc<InMemorySocialGraph>,
    /// Durable feed, for asserting persistence
    pub feed: Arc<InMemoryFeedStore>,
    encoder: JwtEncoder,
}

/// Parsed HTTP response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.server.internal_token = INTERNAL_TOKEN.to_string();
    config.worker.enabled = false;
    config.presence.offline_grace_ms = 50;
    config
}

impl TestApp {
    /// Create a new test application over in-memory backends
    pub fn new() -> Self {
        let config = test_config();
        let social = Arc::new(InMemorySocialGraph::new());
        let feed = Arc::new(InMemoryFeedStore::new());

        let backends = Backends {
            db: None,
            stores: Stores {
                preferences: Arc::new(InMemoryPreferenceStore::new()),
                social: social.clone(),
                activity: Arc::new(InMemoryActivityStore::new()),
                search_source: Arc::new(InMemorySearchSource::new()),
            },
            cache: Arc::new(CacheManager::in_memory()),
            feed: feed.clone(),
            search: Arc::new(InMemorySearchIndex::new()),
        };

        let encoder = JwtEncoder::new(&config.auth);
        let (state, _) = build_state(config, backends);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            social,
            feed,
            encoder,
        }
    }

    /// Sign an access token for a fresh user
    pub fn user(&self, username: &str) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let token = self
            .encoder
            .generate_access_token(id, username)
            .expect("Failed to sign token");
        (id, token)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        self.send(req, body).await
    }

    /// Post a domain event through the internal ingress
    pub async fn post_event(&self, event: Value) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/events")
            .header("Content-Type", "application/json")
            .header("x-internal-token", INTERNAL_TOKEN);
        self.send(req, Some(event)).await
    }

    async fn send(&self, req: axum::http::request::Builder, body: Option<Value>) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// A `post_liked` event from `actor` to `owner`
pub fn like_event(actor: Uuid, actor_name: &str, owner: Uuid, post_id: Uuid) -> Value {
    serde_json::json!({
        "actor": { "id": actor, "name": actor_name },
        "recipients": [owner],
        "payload": { "kind": "post_liked", "post_id": post_id },
    })
}
