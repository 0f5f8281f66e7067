//! In-memory snapshot backend for testing.
//!
//! Holds the snapshot in a `Vec<u8>` behind a `RwLock`. Nothing is persisted;
//! use this for unit tests that need a real backend without touching disk.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{SnapshotBackend, StorageError};

/// An in-memory snapshot backend.
///
/// Clones share the same underlying snapshot.
///
/// # Examples
///
/// ```
/// # use vaultsync_storage::{MemoryBackend, SnapshotBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new();
/// backend.write(b"[]").await.unwrap();
/// assert_eq!(backend.read().await.unwrap(), Some(b"[]".to_vec()));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a backend with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SnapshotBackend for MemoryBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        *self.data.write().await = Some(bytes.to_vec());
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.data.read().await.is_some())
    }

    fn location(&self) -> String {
        "memory".to_owned()
    }
}
