//! Selects the feed store implementation from configuration.

use std::sync::Arc;

use tracing::info;

use sidechain_core::config::FeedConfig;
use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::FeedStore;

/// Build the configured feed store.
pub fn build_feed_store(config: &FeedConfig) -> AppResult<Arc<dyn FeedStore>> {
    match config.provider.as_str() {
        #[cfg(feature = "http")]
        "http" => {
            info!(base_url = %config.base_url, feed_group = %config.notification_feed_group, "Initializing hosted feed store");
            Ok(Arc::new(crate::providers::HttpFeedStore::new(config)?))
        }
        #[cfg(feature = "memory")]
        "memory" => {
            info!("Initializing in-memory feed store");
            Ok(Arc::new(crate::providers::InMemoryFeedStore::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown feed provider: '{other}'. Supported: memory, http"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = FeedConfig {
            provider: "kafka".into(),
            ..FeedConfig::default()
        };
        let err = build_feed_store(&config).unwrap_err();
        assert_eq!(err.kind, sidechain_core::error::ErrorKind::Configuration);
    }
}
