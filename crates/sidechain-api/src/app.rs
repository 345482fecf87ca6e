//! Application builder: wires backends, services, the realtime engine and
//! background tasks into a running server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;

use sidechain_auth::JwtDecoder;
use sidechain_cache::CacheManager;
use sidechain_core::config::AppConfig;
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::{FeedStore, SearchIndex};
use sidechain_database::DatabasePool;
use sidechain_database::connection::Stores;
use sidechain_realtime::{EngineDeps, RealtimeEngine};
use sidechain_service::{ActivityStatusService, NotificationService, PreferenceService};
use sidechain_worker::{ReconciliationSweeper, Supervisor, start_background_tasks};

use crate::router::build_router;
use crate::state::AppState;

/// External systems the application talks to.
#[derive(Debug, Clone)]
pub struct Backends {
    /// `None` when the relational stores are in-memory.
    pub db: Option<DatabasePool>,
    pub stores: Stores,
    pub cache: Arc<CacheManager>,
    pub feed: Arc<dyn FeedStore>,
    pub search: Arc<dyn SearchIndex>,
}

impl Backends {
    /// Connect every configured backend. An empty `database.url` selects
    /// the in-memory stores.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        tracing::info!(provider = %config.cache.provider, "Initializing cache");
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        let feed = sidechain_feed::build_feed_store(&config.feed)?;
        let search = sidechain_search::build_search_index(&config.search)?;

        let (db, stores) = if config.database.url.is_empty() {
            tracing::warn!("No database URL configured, using in-memory stores");
            (None, in_memory_stores())
        } else {
            let pool = DatabasePool::connect(&config.database).await?;
            let stores = pool.stores();
            (Some(pool), stores)
        };

        Ok(Self {
            db,
            stores,
            cache,
            feed,
            search,
        })
    }

    /// Process-local backends for tests and local development.
    pub fn in_memory() -> Self {
        Self {
            db: None,
            stores: in_memory_stores(),
            cache: Arc::new(CacheManager::in_memory()),
            feed: Arc::new(sidechain_feed::providers::InMemoryFeedStore::new()),
            search: Arc::new(sidechain_search::providers::InMemorySearchIndex::new()),
        }
    }
}

fn in_memory_stores() -> Stores {
    use sidechain_database::memory::{
        InMemoryActivityStore, InMemoryPreferenceStore, InMemorySearchSource,
        InMemorySocialGraph,
    };
    Stores {
        preferences: Arc::new(InMemoryPreferenceStore::new()),
        social: Arc::new(InMemorySocialGraph::new()),
        activity: Arc::new(InMemoryActivityStore::new()),
        search_source: Arc::new(InMemorySearchSource::new()),
    }
}

/// Build the shared state and the reconciliation sweeper over `backends`.
pub fn build_state(
    config: AppConfig,
    backends: Backends,
) -> (AppState, Arc<ReconciliationSweeper>) {
    let engine = RealtimeEngine::new(
        &config,
        EngineDeps {
            social: backends.stores.social.clone(),
            activity: backends.stores.activity.clone(),
            preferences: backends.stores.preferences.clone(),
            feed: backends.feed.clone(),
            cache: backends.cache.clone(),
        },
    );

    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, backends.cache.clone()));
    let notifications = Arc::new(NotificationService::new(
        backends.feed.clone(),
        backends.cache.clone(),
        engine.registry.clone(),
        config.notifications.clone(),
    ));
    let preferences = Arc::new(PreferenceService::new(engine.gate.clone()));
    let activity_status = Arc::new(ActivityStatusService::new(
        backends.stores.activity.clone(),
        engine.presence.clone(),
    ));
    let sweeper = Arc::new(ReconciliationSweeper::new(
        config.reconciliation.clone(),
        backends.stores.search_source.clone(),
        backends.search.clone(),
    ));

    let state = AppState {
        config: Arc::new(config),
        started_at: Instant::now(),
        db: backends.db,
        cache: backends.cache,
        feed: backends.feed,
        search: backends.search,
        jwt_decoder,
        engine,
        notifications,
        preferences,
        activity_status,
    };
    (state, sweeper)
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the server until Ctrl+C or SIGTERM, then drains sockets and stops
/// background tasks.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Sidechain realtime v{}", env!("CARGO_PKG_VERSION"));

    let backends = Backends::connect(&config).await?;
    let (state, sweeper) = build_state(config.clone(), backends);

    let supervisor = Supervisor::new();
    if config.worker.enabled {
        start_background_tasks(&supervisor, &config, state.engine.clone(), sweeper);
    }

    let engine = state.engine.clone();
    let db = state.db.clone();
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "Sidechain server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open sockets keep the server from draining until closed.
            engine.shutdown().await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let report = supervisor
        .shutdown(Duration::from_secs(config.worker.shutdown_timeout_seconds))
        .await;
    tracing::info!(
        stopped = report.stopped,
        aborted = report.aborted,
        "Background tasks stopped"
    );

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("Sidechain server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
