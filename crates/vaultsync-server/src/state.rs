//! Shared application state for the `vaultsync` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;

use tracing::{info, warn};
use vaultsync_core::cache::LocalCache;
use vaultsync_core::manager::SecretManager;

use crate::config::ServerConfig;
use crate::error::AppError;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Vault-backed manager, `None` when the gateway failed to initialize.
    pub manager: Option<Arc<SecretManager>>,
    /// Local cache, always available.
    pub cache: LocalCache,
    /// Why the manager is missing.
    pub init_error: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.manager.is_some())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with a working manager. The cache is the manager's own.
    pub fn new(manager: SecretManager) -> Self {
        let cache = manager.cache().clone();
        Self {
            manager: Some(Arc::new(manager)),
            cache,
            init_error: None,
        }
    }

    /// State without a vault connection. Only cache-backed routes work.
    pub fn uninitialized(cache: LocalCache, reason: impl Into<String>) -> Self {
        Self {
            manager: None,
            cache,
            init_error: Some(reason.into()),
        }
    }

    /// Build the state from configuration.
    ///
    /// Never fails: a gateway problem is recorded and served as 503.
    pub fn from_config(config: &ServerConfig) -> Self {
        let cache = LocalCache::open(&config.cache_file);

        let gateway = match &config.gateway {
            Ok(gateway) => gateway,
            Err(reason) => {
                warn!(reason = %reason, "vault gateway not configured; starting uninitialized");
                return Self::uninitialized(cache, reason.clone());
            }
        };

        match SecretManager::connect(gateway, cache.clone()) {
            Ok(manager) => {
                info!(
                    organization_id = %gateway.organization_id(),
                    cache = %cache.location(),
                    "secret manager initialized"
                );
                Self::new(manager)
            }
            Err(e) => {
                warn!(error = %e, "failed to initialize secret manager");
                Self::uninitialized(cache, e.to_string())
            }
        }
    }

    /// The manager, or 503 with the initialization failure.
    pub fn manager(&self) -> Result<&SecretManager, AppError> {
        self.manager.as_deref().ok_or_else(|| {
            AppError::Unavailable(format!(
                "secret manager not initialized: {}",
                self.init_error.as_deref().unwrap_or("unknown reason")
            ))
        })
    }
}
