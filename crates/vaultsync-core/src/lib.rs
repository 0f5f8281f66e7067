//! Core library for `vaultsync`.
//!
//! Contains the secret record model, the local cache store, the `.env`
//! format converters, the namespacing formatter, the remote vault gateway
//! trait with its implementations, and the [`manager::SecretManager`] that
//! ties the gateway and the cache together. This crate depends on
//! `vaultsync-storage` for the snapshot backend trait and knows nothing
//! about HTTP routing or command-line parsing.

pub mod cache;
pub mod convert;
pub mod error;
pub mod gateway;
#[cfg(feature = "http-gateway")]
pub mod http_gateway;
pub mod manager;
pub mod memory_gateway;
pub mod namespace;
pub mod record;

pub use record::{RecordIndex, SecretRecord, SecretSummary};
