//! File snapshot backend (production default).
//!
//! The snapshot lives in a single file (conventionally `data/secrets.json`).
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a reader never observes a half-written snapshot.
//!
//! # Concurrency
//!
//! Writes issued through the same `FileBackend` (or its clones) are
//! serialized with a `tokio::sync::Mutex`. Separate processes writing the
//! same path are not coordinated: the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::{SnapshotBackend, StorageError};

/// A snapshot backend backed by one file on local disk.
///
/// # Examples
///
/// ```no_run
/// # use vaultsync_storage::FileBackend;
/// let backend = FileBackend::new("data/secrets.json");
/// ```
#[derive(Clone)]
pub struct FileBackend {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileBackend {
    /// Create a backend for the file at `path`.
    ///
    /// Nothing is touched on disk until the first read or write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Return the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, reason: impl std::fmt::Display) -> StorageError {
        StorageError::Write {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotBackend for FileBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(format!("cannot create parent directory: {e}")))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.write_error(e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_error(e));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StorageError::Read {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
