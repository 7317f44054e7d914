//! Error types for the grocery tracker core.

use std::fmt;

/// Result type for grocertrack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the tracker core.
///
/// Every variant is recoverable. Nothing in this crate treats a data or
/// input problem as fatal; callers decide how (or whether) to surface it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Reconciliation was attempted with fewer than two usable values.
    ///
    /// A value is usable when it parses to a finite number greater than zero.
    /// `present` is how many of the three fields qualified (0 or 1).
    ///
    /// **Recovery:** surface a transient error on the line item. No field is
    /// modified.
    InsufficientInputs {
        /// Number of fields that counted as present.
        present: usize,
    },

    /// Stored data could not be parsed, or parsed into an unexpected shape.
    ///
    /// Common causes:
    /// - Truncated or hand-edited storage file
    /// - A list stored as something other than a JSON object
    /// - Wrong value types for known fields
    ///
    /// **Recovery:** start from an empty collection.
    MalformedPersistedData(String),

    /// A durable write did not complete.
    ///
    /// Common causes:
    /// - Storage quota exceeded / disk full
    /// - Data directory not writable
    ///
    /// **Recovery:** keep in-memory state; the next successful write catches up.
    StorageWriteFailure(String),

    /// Storage backend failed while reading or deleting.
    BackendError(String),

    /// Encoding the in-memory collection failed.
    SerializationError(String),

    /// Invalid configuration (unknown backend name, missing data dir, ...).
    ConfigError(String),

    /// Backend does not support an optional operation.
    NotImplemented(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InsufficientInputs { present } => write!(
                f,
                "Insufficient inputs: need at least 2 values, got {}",
                present
            ),
            Error::MalformedPersistedData(msg) => write!(f, "Malformed persisted data: {}", msg),
            Error::StorageWriteFailure(msg) => write!(f, "Storage write failure: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::MalformedPersistedData(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
