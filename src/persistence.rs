//! Persistence gateway: the list collection and theme in key-value storage.
//!
//! # Stored layout
//!
//! ```text
//! grocertrack_data_v1         JSON array of lists (camelCase fields)
//! grocertrack_theme           "light" | "dark"
//! grocertrack_schema_version  "2"
//! ```
//!
//! # Failure policy
//!
//! Loading never fails: unreadable or malformed data is logged, reported to
//! [`StorageMetrics::record_recovered`] and replaced by an empty collection
//! (or no theme). Saving returns an error for callers that want it, but the
//! in-memory state stays authoritative and nothing is retried.

use crate::backend::StorageBackend;
use crate::collection::ListCollection;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::list::ShoppingList;
use crate::migration::{self, MigrationReport, CURRENT_SCHEMA_VERSION};
use crate::observability::{LogMetrics, StorageMetrics};
use crate::state::Theme;
use std::time::Instant;

/// Decode a stored document: parse, migrate, then decode into lists.
///
/// # Errors
///
/// `Error::MalformedPersistedData` when the text is not JSON, is not an
/// array, or an entry does not have the shape of a list.
pub fn decode_lists(
    raw: &str,
    stored_version: Option<u32>,
) -> Result<(ListCollection, MigrationReport)> {
    let mut doc: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| Error::MalformedPersistedData(format!("invalid JSON: {}", e)))?;

    let report = migration::migrate(&mut doc, stored_version)?;

    let lists: Vec<ShoppingList> = serde_json::from_value(doc)
        .map_err(|e| Error::MalformedPersistedData(format!("unexpected shape: {}", e)))?;

    Ok((ListCollection::from_lists(lists), report))
}

/// Encode the collection in the current schema.
///
/// # Errors
///
/// `Error::SerializationError` if encoding fails.
pub fn encode_lists(lists: &ListCollection) -> Result<String> {
    serde_json::to_string(lists).map_err(|e| Error::SerializationError(e.to_string()))
}

/// Reads and writes tracker data through a [`StorageBackend`].
///
/// # Example
///
/// ```no_run
/// use grocertrack::backend::InMemoryBackend;
/// use grocertrack::persistence::PersistenceGateway;
///
/// #[tokio::main]
/// async fn main() {
///     let gateway = PersistenceGateway::new(InMemoryBackend::new());
///     let lists = gateway.load_lists().await;
///     assert!(lists.is_empty());
/// }
/// ```
pub struct PersistenceGateway<B: StorageBackend> {
    backend: B,
    config: StoreConfig,
    metrics: Box<dyn StorageMetrics>,
}

impl<B: StorageBackend> PersistenceGateway<B> {
    /// Gateway with default keys and logging metrics.
    pub fn new(backend: B) -> Self {
        PersistenceGateway {
            backend,
            config: StoreConfig::default(),
            metrics: Box::new(LogMetrics),
        }
    }

    /// Use custom storage keys.
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn StorageMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Schema version recorded alongside the data, if any.
    ///
    /// An unreadable marker is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend cannot be read.
    pub async fn stored_schema_version(&self) -> Result<Option<u32>> {
        let key = &self.config.schema_version_key;
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                self.metrics
                    .record_recovered(key, &format!("bad schema version {:?}: {}", raw, e));
                Ok(None)
            }
        }
    }

    /// Load, migrate and decode the stored lists.
    ///
    /// Migrated data is written back in the current shape straight away.
    ///
    /// # Errors
    ///
    /// - `Error::BackendError`: storage could not be read
    /// - `Error::MalformedPersistedData`: stored text is unusable
    pub async fn try_load_lists(&self) -> Result<ListCollection> {
        let key = &self.config.data_key;

        let start = Instant::now();
        let raw = self.backend.get(key).await?;
        self.metrics
            .record_load(key, raw.is_some(), start.elapsed());

        let Some(raw) = raw else {
            return Ok(ListCollection::new());
        };

        let stored_version = self.stored_schema_version().await?;
        let (lists, report) = decode_lists(&raw, stored_version)?;
        self.metrics.record_migration(&report);

        if report.changed() || stored_version != Some(CURRENT_SCHEMA_VERSION) {
            // Recorded by metrics on failure; the next save retries implicitly.
            let _ = self.save_lists(&lists).await;
        }

        Ok(lists)
    }

    /// Load the stored lists, substituting an empty collection on any failure.
    pub async fn load_lists(&self) -> ListCollection {
        match self.try_load_lists().await {
            Ok(lists) => lists,
            Err(e) => {
                self.metrics
                    .record_recovered(&self.config.data_key, &e.to_string());
                ListCollection::new()
            }
        }
    }

    /// Write the whole collection, then stamp the schema version.
    ///
    /// # Errors
    ///
    /// - `Error::SerializationError`: encoding failed (nothing was written)
    /// - `Error::StorageWriteFailure`: the write did not complete; whatever
    ///   was stored before is left in place
    pub async fn save_lists(&self, lists: &ListCollection) -> Result<()> {
        let key = &self.config.data_key;
        let payload = encode_lists(lists)?;
        let bytes = payload.len();

        let start = Instant::now();
        self.write(key, payload).await?;
        self.metrics.record_save(key, bytes, start.elapsed());

        self.write(
            &self.config.schema_version_key,
            CURRENT_SCHEMA_VERSION.to_string(),
        )
        .await
    }

    /// Stored theme, or `None` when absent or unrecognised.
    pub async fn load_theme(&self) -> Option<Theme> {
        let key = &self.config.theme_key;
        let start = Instant::now();
        let raw = match self.backend.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                self.metrics.record_recovered(key, &e.to_string());
                return None;
            }
        };
        self.metrics
            .record_load(key, raw.is_some(), start.elapsed());

        match raw?.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(e) => {
                self.metrics.record_recovered(key, &e.to_string());
                None
            }
        }
    }

    /// # Errors
    ///
    /// `Error::StorageWriteFailure` if the write did not complete.
    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        let key = &self.config.theme_key;
        let start = Instant::now();
        self.write(key, theme.as_str().to_string()).await?;
        self.metrics.record_save(key, theme.as_str().len(), start.elapsed());
        Ok(())
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        self.backend.set(key, value).await.map_err(|e| {
            let err = match e {
                Error::StorageWriteFailure(msg) => Error::StorageWriteFailure(msg),
                other => Error::StorageWriteFailure(other.to_string()),
            };
            self.metrics.record_error(key, &err.to_string());
            err
        })
    }
}
