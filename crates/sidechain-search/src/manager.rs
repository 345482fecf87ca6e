//! Selects the search index implementation from configuration.

use std::sync::Arc;

use tracing::info;

use sidechain_core::config::SearchConfig;
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::SearchIndex;

/// Build the configured search index.
pub fn build_search_index(config: &SearchConfig) -> AppResult<Arc<dyn SearchIndex>> {
    match config.provider.as_str() {
        #[cfg(feature = "elasticsearch")]
        "elasticsearch" => {
            info!(url = %config.url, "Initializing Elasticsearch index client");
            Ok(Arc::new(crate::providers::ElasticsearchIndex::new(config)?))
        }
        #[cfg(feature = "memory")]
        "memory" => {
            info!("Initializing in-memory search index");
            Ok(Arc::new(crate::providers::InMemorySearchIndex::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown search provider: '{other}'. Supported: memory, elasticsearch"
        ))),
    }
}
