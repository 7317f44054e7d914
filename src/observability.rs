//! Hooks for watching persistence activity.
//!
//! The gateway reports every load, save, migration and recovered failure to
//! a [`StorageMetrics`] implementation. The trait's default methods log via
//! the `log` crate, so an empty `impl StorageMetrics for MyType {}` already
//! gives useful output. [`NoOpMetrics`] silences everything.
//!
//! ```ignore
//! use grocertrack::observability::StorageMetrics;
//! use std::time::Duration;
//!
//! struct Counters { saves: AtomicUsize }
//!
//! impl StorageMetrics for Counters {
//!     fn record_save(&self, _key: &str, _bytes: usize, _duration: Duration) {
//!         self.saves.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use crate::migration::MigrationReport;
use std::time::Duration;

/// Trait for persistence metrics collection.
pub trait StorageMetrics: Send + Sync {
    /// A key was read (`found` is false when it was absent).
    fn record_load(&self, key: &str, found: bool, duration: Duration) {
        debug!("Storage LOAD {} found={} took {:?}", key, found, duration);
    }

    /// A key was written.
    fn record_save(&self, key: &str, bytes: usize, duration: Duration) {
        debug!("Storage SAVE {} ({} bytes) took {:?}", key, bytes, duration);
    }

    /// Migrations ran over loaded data.
    fn record_migration(&self, report: &MigrationReport) {
        if report.changed() {
            info!(
                "Migrated stored data v{} -> v{} ({} records rewritten)",
                report.from_version, report.to_version, report.rewritten
            );
        }
    }

    /// Stored data could not be used and was replaced by a default.
    fn record_recovered(&self, key: &str, error: &str) {
        warn!("Storage RECOVERED {}: {}", key, error);
    }

    /// A write failed; in-memory state stays authoritative.
    fn record_error(&self, key: &str, error: &str) {
        error!("Storage ERROR for {}: {}", key, error);
    }
}

/// Default logging metrics.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl StorageMetrics for LogMetrics {}

/// Metrics implementation that records nothing.
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl StorageMetrics for NoOpMetrics {
    fn record_load(&self, _key: &str, _found: bool, _duration: Duration) {}
    fn record_save(&self, _key: &str, _bytes: usize, _duration: Duration) {}
    fn record_migration(&self, _report: &MigrationReport) {}
    fn record_recovered(&self, _key: &str, _error: &str) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}
