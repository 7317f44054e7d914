//! In-memory storage backend.
//!
//! Uses DashMap for concurrent access. Nothing survives the process; used
//! for tests and for running without a data directory.

use super::StorageBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-memory key-value store.
///
/// Clones share the same underlying map.
///
/// # Example
///
/// ```no_run
/// use grocertrack::backend::{InMemoryBackend, StorageBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///     backend.set("grocertrack_theme", "dark".to_string()).await?;
///     assert_eq!(backend.get("grocertrack_theme").await?.as_deref(), Some("dark"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        InMemoryBackend {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Current number of keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Total stored bytes across keys and values.
    pub fn stats(&self) -> StorageStats {
        let total_bytes = self
            .store
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum();

        StorageStats {
            total_entries: self.store.len(),
            total_bytes,
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.store.get(key).map(|entry| entry.value().clone());
        debug!(
            "InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        debug!("InMemory SET {} ({} bytes)", key, value.len());
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        debug!("InMemory DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("InMemory CLEAR_ALL executed - all keys removed");
        Ok(())
    }
}

/// Storage statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageStats {
    pub total_entries: usize,
    pub total_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inmemory_backend_set_get() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", "value1".to_string())
            .await
            .expect("Failed to set");

        let result = backend.get("key1").await.expect("Failed to get");
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_inmemory_backend_miss() {
        let backend = InMemoryBackend::new();

        let result = backend.get("nonexistent").await.expect("Failed to get");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_inmemory_backend_overwrite() {
        let backend = InMemoryBackend::new();
        backend.set("k", "a".to_string()).await.expect("Failed to set");
        backend.set("k", "b".to_string()).await.expect("Failed to set");

        assert_eq!(backend.get("k").await.unwrap(), Some("b".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_inmemory_backend_delete() {
        let backend = InMemoryBackend::new();

        backend
            .set("key1", "value1".to_string())
            .await
            .expect("Failed to set");
        assert!(backend
            .exists("key1")
            .await
            .expect("Failed to check exists"));

        backend.delete("key1").await.expect("Failed to delete");
        assert!(!backend
            .exists("key1")
            .await
            .expect("Failed to check exists"));

        // Deleting again is fine.
        backend.delete("key1").await.expect("Failed to delete");
    }

    #[tokio::test]
    async fn test_inmemory_backend_clear_all() {
        let backend = InMemoryBackend::new();
        backend.set("a", "1".to_string()).await.expect("Failed to set");
        backend.set("b", "2".to_string()).await.expect("Failed to set");
        assert_eq!(backend.len(), 2);

        backend.clear_all().await.expect("Failed to clear");
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_inmemory_backend_stats() {
        let backend = InMemoryBackend::new();
        backend
            .set("key", "value".to_string())
            .await
            .expect("Failed to set");

        let stats = backend.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 8);
    }

    #[tokio::test]
    async fn test_inmemory_backend_clone_shares_store() {
        let backend1 = InMemoryBackend::new();
        backend1
            .set("key", "value".to_string())
            .await
            .expect("Failed to set");

        let backend2 = backend1.clone();
        assert_eq!(
            backend2.get("key").await.expect("Failed to get"),
            Some("value".to_string())
        );
    }
}
