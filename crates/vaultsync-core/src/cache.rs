//! Local cache store.
//!
//! The cache is an offline mirror of the vault: one JSON array of
//! [`SecretRecord`]s, written as a whole on every sync. There is no merge
//! with the previous snapshot, so callers must pass the complete,
//! authoritative record set to [`LocalCache::sync`].
//!
//! Two read paths exist because callers disagree on what a missing snapshot
//! means. [`LocalCache::try_load`] reports it as [`CacheSnapshot::Missing`];
//! [`LocalCache::load`] turns it into [`CacheError::NotSynced`].

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use vaultsync_storage::{FileBackend, SnapshotBackend};

use crate::error::CacheError;
use crate::record::{RecordIndex, SecretRecord};

/// Default location of the cache snapshot.
pub const DEFAULT_CACHE_FILE: &str = "data/secrets.json";

/// Outcome of a permissive cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSnapshot {
    /// No sync has ever written a snapshot.
    Missing,
    /// The snapshot exists (it may still be empty).
    Present(RecordIndex),
}

impl CacheSnapshot {
    /// Treat a missing snapshot as an empty one.
    pub fn into_index(self) -> RecordIndex {
        match self {
            Self::Missing => RecordIndex::new(),
            Self::Present(index) => index,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Durable snapshot of all secrets, keyed by secret name after load.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct LocalCache {
    backend: Arc<dyn SnapshotBackend>,
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("location", &self.backend.location())
            .finish()
    }
}

impl LocalCache {
    /// Wrap an arbitrary snapshot backend.
    pub fn new(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self { backend }
    }

    /// Open a file-backed cache at `path`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileBackend::new(path)))
    }

    /// Where the snapshot lives.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Overwrite the snapshot with `records`, in order.
    ///
    /// Serialization is deterministic, so syncing the same records twice
    /// yields byte-identical snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Storage`] if the snapshot cannot be written.
    pub async fn sync(&self, records: &[SecretRecord]) -> Result<(), CacheError> {
        let mut bytes =
            serde_json::to_vec_pretty(records).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        bytes.push(b'\n');

        self.backend.write(&bytes).await?;

        info!(
            location = %self.backend.location(),
            count = records.len(),
            "synced secrets to local cache"
        );
        Ok(())
    }

    /// Read the snapshot, reporting a never-synced cache as
    /// [`CacheSnapshot::Missing`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Storage`] on read failure and
    /// [`CacheError::Corrupt`] if the snapshot is not a record array.
    pub async fn try_load(&self) -> Result<CacheSnapshot, CacheError> {
        match self.read_records().await? {
            None => {
                warn!(location = %self.backend.location(), "local cache not found");
                Ok(CacheSnapshot::Missing)
            }
            Some(records) => Ok(CacheSnapshot::Present(RecordIndex::from_records(records))),
        }
    }

    /// Read the snapshot as a key-indexed view.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotSynced`] if no snapshot exists, plus the
    /// errors of [`LocalCache::try_load`].
    pub async fn load(&self) -> Result<RecordIndex, CacheError> {
        match self.try_load().await? {
            CacheSnapshot::Present(index) => Ok(index),
            CacheSnapshot::Missing => Err(self.not_synced()),
        }
    }

    /// Read the snapshot as the ordered record sequence it was synced from.
    ///
    /// # Errors
    ///
    /// Same as [`LocalCache::load`].
    pub async fn records(&self) -> Result<Vec<SecretRecord>, CacheError> {
        self.read_records()
            .await?
            .ok_or_else(|| self.not_synced())
    }

    async fn read_records(&self) -> Result<Option<Vec<SecretRecord>>, CacheError> {
        let Some(bytes) = self.backend.read().await? else {
            return Ok(None);
        };

        let records = serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
            location: self.backend.location(),
            reason: e.to_string(),
        })?;
        Ok(Some(records))
    }

    fn not_synced(&self) -> CacheError {
        CacheError::NotSynced {
            location: self.backend.location(),
        }
    }
}
