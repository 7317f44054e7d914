//! Storage configuration.
//!
//! Defaults match the keys the tracker has always used, so existing data is
//! picked up without any setup. Environment overrides:
//!
//! - `GROCERTRACK_BACKEND`: `memory` or `file` (default `file` when a data
//!   directory is known, otherwise `memory`)
//! - `GROCERTRACK_DATA_DIR`: directory for the file backend

use crate::backend::{AnyBackend, InMemoryBackend};
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Key holding the JSON array of shopping lists.
pub const DEFAULT_DATA_KEY: &str = "grocertrack_data_v1";
/// Key holding `"light"` or `"dark"`.
pub const DEFAULT_THEME_KEY: &str = "grocertrack_theme";
/// Key holding the schema version the data key was written with.
pub const DEFAULT_SCHEMA_VERSION_KEY: &str = "grocertrack_schema_version";

pub const ENV_BACKEND: &str = "GROCERTRACK_BACKEND";
pub const ENV_DATA_DIR: &str = "GROCERTRACK_DATA_DIR";

/// Which storage backend to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    #[cfg(feature = "file")]
    File,
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(BackendKind::Memory),
            #[cfg(feature = "file")]
            "file" => Ok(BackendKind::File),
            other => Err(Error::ConfigError(format!("unknown backend: {}", other))),
        }
    }
}

/// Storage keys and backend selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_key: String,
    pub theme_key: String,
    pub schema_version_key: String,
    pub backend: BackendKind,
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_key: DEFAULT_DATA_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            schema_version_key: DEFAULT_SCHEMA_VERSION_KEY.to_string(),
            backend: BackendKind::Memory,
            data_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    pub fn with_theme_key(mut self, key: impl Into<String>) -> Self {
        self.theme_key = key.into();
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Use the file backend rooted at `dir`.
    #[cfg(feature = "file")]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self.backend = BackendKind::File;
        self
    }

    /// Defaults overridden from the process environment.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` for an unknown backend name.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        #[cfg(feature = "file")]
        {
            if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
                config = config.with_data_dir(dir);
            }
        }

        if let Some(name) = lookup(ENV_BACKEND).filter(|b| !b.trim().is_empty()) {
            config.backend = name.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` when a key is blank, two keys collide, or the
    /// file backend has no data directory.
    pub fn validate(&self) -> Result<()> {
        for (name, key) in [
            ("data_key", &self.data_key),
            ("theme_key", &self.theme_key),
            ("schema_version_key", &self.schema_version_key),
        ] {
            if key.trim().is_empty() {
                return Err(Error::ConfigError(format!("{} must not be empty", name)));
            }
        }
        if self.data_key == self.theme_key
            || self.data_key == self.schema_version_key
            || self.theme_key == self.schema_version_key
        {
            return Err(Error::ConfigError("storage keys must be distinct".to_string()));
        }
        #[cfg(feature = "file")]
        {
            if self.backend == BackendKind::File && self.data_dir.is_none() {
                return Err(Error::ConfigError(format!(
                    "file backend needs a data directory (set {})",
                    ENV_DATA_DIR
                )));
            }
        }
        Ok(())
    }
}

/// Build the backend described by `config`.
///
/// # Errors
///
/// `Error::ConfigError` when the configuration is invalid.
pub fn open_backend(config: &StoreConfig) -> Result<AnyBackend> {
    config.validate()?;
    Ok(match config.backend {
        BackendKind::Memory => AnyBackend::InMemory(InMemoryBackend::new()),
        #[cfg(feature = "file")]
        BackendKind::File => {
            let dir = config
                .data_dir
                .clone()
                .ok_or_else(|| Error::ConfigError("missing data directory".to_string()))?;
            info!("Using file storage at {}", dir.display());
            AnyBackend::File(crate::backend::FileBackend::new(dir))
        }
    })
}
