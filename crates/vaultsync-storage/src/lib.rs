//! Snapshot storage for `vaultsync`.
//!
//! This crate defines the [`SnapshotBackend`] trait, a single-document
//! storage interface that knows nothing about secrets, records, or formats.
//! The local cache in `vaultsync-core` serializes its records and hands the
//! bytes to a backend, which only has to persist and return them.
//!
//! Two implementations are provided:
//!
//! - [`FileBackend`]: production default, a file on local disk
//! - [`MemoryBackend`]: in-memory, for testing only

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileBackend;
pub use memory::MemoryBackend;

/// A pluggable store for one opaque snapshot document.
///
/// A snapshot is always replaced as a whole: there is no partial update,
/// append, or merge. Implementations must be safe to share across async
/// tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait SnapshotBackend: Send + Sync + 'static {
    /// Read the current snapshot.
    ///
    /// Returns `Ok(None)` if no snapshot has ever been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the snapshot exists but cannot be read.
    async fn read(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the snapshot with `bytes`, discarding any prior content.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the target is not writable.
    async fn write(&self, bytes: &[u8]) -> Result<(), StorageError>;

    /// Check whether a snapshot has been written.
    ///
    /// The default implementation calls [`read`](SnapshotBackend::read).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.read().await?.is_some())
    }

    /// Human-readable location of the snapshot, used in logs and errors.
    fn location(&self) -> String;
}
