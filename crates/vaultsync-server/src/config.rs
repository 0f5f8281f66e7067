//! Server configuration for `vaultsync`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Server settings use `VAULTSYNC_*` variables; the vault connection uses the
//! `BW_*` variables read by [`GatewayConfig`].

use std::net::SocketAddr;
use std::path::PathBuf;

use vaultsync_core::cache::DEFAULT_CACHE_FILE;
use vaultsync_core::gateway::GatewayConfig;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    8000,
);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Path of the local cache snapshot.
    pub cache_file: PathBuf,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Vault connection settings, or why they could not be loaded.
    ///
    /// A failure does not stop the server: it starts uninitialized and
    /// reports the reason from `/health`.
    pub gateway: Result<GatewayConfig, String>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `VAULTSYNC_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8000`)
    /// - `PORT`: port to bind on, binds to `0.0.0.0`
    /// - `VAULTSYNC_CACHE_FILE`: cache snapshot path (default: `data/secrets.json`)
    /// - `VAULTSYNC_LOG_LEVEL`: log filter (default: `info`)
    /// - `BW_ACCESS_TOKEN`, `ORGANIZATION_ID`, `BW_PROJECT_ID`, `BW_API_URL`,
    ///   `BW_IDENTITY_URL`: vault connection
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: VAULTSYNC_BIND_ADDR > PORT > default
        let bind_addr = if let Some(addr) = lookup("VAULTSYNC_BIND_ADDR") {
            addr.parse().unwrap_or(DEFAULT_BIND_ADDR)
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.parse().unwrap_or(DEFAULT_BIND_ADDR.port());
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            DEFAULT_BIND_ADDR
        };

        let cache_file = lookup("VAULTSYNC_CACHE_FILE")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE), PathBuf::from);

        let log_level = lookup("VAULTSYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let gateway = GatewayConfig::from_lookup(&lookup).map_err(|e| e.to_string());

        Self {
            bind_addr,
            cache_file,
            log_level,
            gateway,
        }
    }
}
