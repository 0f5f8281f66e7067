//! Error types for `vaultsync-core`.
//!
//! Each subsystem has its own enum. Variants carry enough context to
//! diagnose the problem from a log line; none of them ever include a secret
//! value or the vault access token.

use vaultsync_storage::StorageError;

/// Errors from the remote vault gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Required gateway configuration is missing or malformed.
    #[error("invalid gateway config: {reason}")]
    InvalidConfig { reason: String },

    /// The remote call failed (transport error or non-success status).
    #[error("remote vault request failed: {reason}")]
    Remote { reason: String },

    /// The remote vault answered with a body of an unexpected shape.
    #[error("unexpected response from remote vault: {reason}")]
    UnexpectedResponse { reason: String },

    /// The remote vault has no secret with this id.
    #[error("secret id '{id}' not found in remote vault")]
    NotFound { id: String },
}

/// Errors from the local cache store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No snapshot has been written yet.
    #[error("local cache '{location}' not found; run a sync first")]
    NotSynced { location: String },

    /// The snapshot exists but is not a valid record array.
    #[error("local cache '{location}' is corrupt: {reason}")]
    Corrupt { location: String, reason: String },

    /// Records could not be serialized into a snapshot.
    #[error("failed to serialize cache snapshot: {reason}")]
    Serialization { reason: String },

    /// The storage backend failed.
    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from format conversion file operations.
///
/// Parsing itself never fails: unrecognized lines are ignored.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A source or target file could not be read or written.
    #[error("i/o error on '{path}': {reason}")]
    Io { path: String, reason: String },

    /// A JSON source file is not a valid record array.
    #[error("invalid record JSON in '{path}': {reason}")]
    Json { path: String, reason: String },
}

/// Errors from the secret manager service.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// No secret with this key exists in the vault.
    #[error("secret '{key}' not found")]
    NotFound { key: String },

    /// The remote vault gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The local cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
