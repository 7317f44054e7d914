//! File storage backend: one file per key under a data directory.
//!
//! Writes go to a temporary sibling file that is then renamed over the
//! target, so a failed write leaves the previous value readable.

use super::StorageBackend;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable on-device key-value store backed by plain files.
///
/// # Example
///
/// ```no_run
/// use grocertrack::backend::{FileBackend, StorageBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = FileBackend::new("/tmp/grocertrack");
///     backend.set("grocertrack_theme", "light".to_string()).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for `key`. Keys are restricted to characters that are safe as
    /// a single file name on every platform.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(Error::BackendError(format!("invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!("File GET {} -> HIT ({} bytes)", key, value.len());
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("File GET {} -> MISS", key);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));

        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&tmp, value.as_bytes()).await?;
            tokio::fs::rename(&tmp, &path).await
        };

        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::StorageWriteFailure(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }

        debug!("File SET {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!("File DELETE {}", key);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            // Not created yet; first write will create it.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        warn!("File CLEAR_ALL executed in {}", self.dir.display());
        Ok(())
    }
}
