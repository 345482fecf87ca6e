//! Full-text search index.

use async_trait::async_trait;

use crate::result::AppResult;

/// Document-level access to the external search index.
#[async_trait]
pub trait SearchIndex: Send + Sync + std::fmt::Debug + 'static {
    /// Create or overwrite a document.
    async fn upsert(&self, index: &str, id: &str, document: serde_json::Value) -> AppResult<()>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, index: &str, id: &str) -> AppResult<()>;

    /// Fetch a document's source.
    async fn get(&self, index: &str, id: &str) -> AppResult<Option<serde_json::Value>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
