//! Process-local search index.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use sidechain_core::error::AppError;
use sidechain_core::result::AppResult;
use sidechain_core::traits::SearchIndex;

/// Documents keyed by `(index, id)`.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    docs: DashMap<(String, String), Value>,
    unavailable: AtomicBool,
}

impl InMemorySearchIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in one index.
    pub fn len(&self, index: &str) -> usize {
        self.docs.iter().filter(|e| e.key().0 == index).count()
    }

    /// Whether an index holds no documents.
    pub fn is_empty(&self, index: &str) -> bool {
        self.len(index) == 0
    }

    /// Make every call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::external_service("Search index unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, index: &str, id: &str, document: Value) -> AppResult<()> {
        self.check()?;
        self.docs.insert((index.to_string(), id.to_string()), document);
        Ok(())
    }

    async fn delete(&self, index: &str, id: &str) -> AppResult<()> {
        self.check()?;
        self.docs.remove(&(index.to_string(), id.to_string()));
        Ok(())
    }

    async fn get(&self, index: &str, id: &str) -> AppResult<Option<Value>> {
        self.check()?;
        Ok(self
            .docs
            .get(&(index.to_string(), id.to_string()))
            .map(|d| d.value().clone()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_overwrites_and_delete_is_idempotent() {
        let index = InMemorySearchIndex::new();
        index.upsert("posts", "1", json!({"title": "old"})).await.unwrap();
        index.upsert("posts", "1", json!({"title": "new"})).await.unwrap();
        index.upsert("users", "1", json!({"username": "x"})).await.unwrap();

        assert_eq!(index.len("posts"), 1);
        assert_eq!(
            index.get("posts", "1").await.unwrap(),
            Some(json!({"title": "new"}))
        );

        index.delete("posts", "1").await.unwrap();
        index.delete("posts", "1").await.unwrap();
        assert!(index.is_empty("posts"));
        assert_eq!(index.len("users"), 1);
    }
}
