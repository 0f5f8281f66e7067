//! Storage error types.
//!
//! Every variant names the snapshot location and the underlying reason so a
//! failed sync can be diagnosed from the log line alone.

/// Errors that can occur while reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The snapshot exists but could not be read.
    #[error("failed to read snapshot at '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The snapshot could not be written (missing permissions, bad parent
    /// path, full disk).
    #[error("failed to write snapshot at '{path}': {reason}")]
    Write { path: String, reason: String },
}
