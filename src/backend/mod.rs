//! Key-value storage backends.
//!
//! The tracker persists to a flat string-keyed, string-valued store, the
//! same shape as browser local storage. Backends only move strings around;
//! encoding and migration live in [`crate::persistence`].

use crate::error::Result;

#[cfg(feature = "file")]
pub mod file;
pub mod inmemory;

#[cfg(feature = "file")]
pub use file::FileBackend;
pub use inmemory::InMemoryBackend;

/// Trait for storage backend implementations.
///
/// All methods take `&self`; implementations use interior mutability or
/// external storage.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait StorageBackend: Send + Sync + Clone {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` - Key present
    /// - `Ok(None)` - Key absent
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `Err` if the write did not complete. The previous value must
    /// then still be readable.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if key exists.
    ///
    /// # Errors
    /// Returns `Err` if backend error occurs
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Health check - verify backend is accessible.
    ///
    /// # Errors
    /// Returns `Err` if backend is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Optional: remove every key (use with caution).
    ///
    /// # Errors
    /// Returns `Err` if operation is not implemented or fails
    async fn clear_all(&self) -> Result<()> {
        Err(crate::error::Error::NotImplemented(
            "clear_all not implemented for this backend".to_string(),
        ))
    }
}

/// Backend chosen at runtime from configuration.
///
/// See [`crate::config::open_backend`].
#[derive(Clone)]
pub enum AnyBackend {
    InMemory(InMemoryBackend),
    #[cfg(feature = "file")]
    File(FileBackend),
}

impl StorageBackend for AnyBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            AnyBackend::InMemory(b) => b.get(key).await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        match self {
            AnyBackend::InMemory(b) => b.set(key, value).await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self {
            AnyBackend::InMemory(b) => b.delete(key).await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.delete(key).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self {
            AnyBackend::InMemory(b) => b.exists(key).await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.exists(key).await,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        match self {
            AnyBackend::InMemory(b) => b.health_check().await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.health_check().await,
        }
    }

    async fn clear_all(&self) -> Result<()> {
        match self {
            AnyBackend::InMemory(b) => b.clear_all().await,
            #[cfg(feature = "file")]
            AnyBackend::File(b) => b.clear_all().await,
        }
    }
}
