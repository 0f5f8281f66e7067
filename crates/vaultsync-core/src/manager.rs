//! Secret manager service.
//!
//! [`SecretManager`] is the one place that combines the remote vault with
//! the local cache. Both the HTTP server and the CLI construct one and call
//! into it; neither talks to the gateway directly.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::LocalCache;
use crate::error::ManagerError;
use crate::gateway::{GatewayConfig, VaultGateway};
use crate::record::{RecordIndex, SecretRecord};

/// Gateway plus cache, scoped to one organization and project.
#[derive(Clone)]
pub struct SecretManager {
    gateway: Arc<dyn VaultGateway>,
    organization_id: String,
    project_ids: Vec<String>,
    cache: LocalCache,
}

impl std::fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManager")
            .field("organization_id", &self.organization_id)
            .field("project_ids", &self.project_ids)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SecretManager {
    pub fn new(gateway: Arc<dyn VaultGateway>, config: &GatewayConfig, cache: LocalCache) -> Self {
        Self {
            gateway,
            organization_id: config.organization_id().to_owned(),
            project_ids: vec![config.project_id().to_owned()],
            cache,
        }
    }

    /// Build a manager over the HTTP gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Gateway`] if the HTTP client cannot be built.
    #[cfg(feature = "http-gateway")]
    pub fn connect(config: &GatewayConfig, cache: LocalCache) -> Result<Self, ManagerError> {
        let gateway = crate::http_gateway::HttpGateway::new(config.clone())?;
        Ok(Self::new(Arc::new(gateway), config, cache))
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Fetch one secret by key.
    ///
    /// If several secrets share the key, the first one listed wins.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] if no secret has this key, or
    /// [`ManagerError::Gateway`] if the vault call fails.
    pub async fn get_secret(&self, name: &str) -> Result<SecretRecord, ManagerError> {
        let summaries = self.gateway.list_secrets(&self.organization_id).await?;
        let Some(summary) = summaries.into_iter().find(|s| s.key == name) else {
            return Err(ManagerError::NotFound {
                key: name.to_owned(),
            });
        };
        Ok(self.gateway.get_secret(&summary.id).await?)
    }

    /// Fetch every secret in the organization, in vault order.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Gateway`] if any vault call fails.
    pub async fn list_secrets(&self) -> Result<Vec<SecretRecord>, ManagerError> {
        let summaries = self.gateway.list_secrets(&self.organization_id).await?;
        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            records.push(self.gateway.get_secret(&summary.id).await?);
        }
        debug!(count = records.len(), "fetched secrets from vault");
        Ok(records)
    }

    /// Create a secret in the configured organization and project.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Gateway`] if the vault rejects the call.
    pub async fn create_secret(
        &self,
        key: &str,
        value: &str,
        note: &str,
    ) -> Result<SecretRecord, ManagerError> {
        let created = self
            .gateway
            .create_secret(&self.organization_id, &self.project_ids, key, value, note)
            .await?;
        info!(key = %created.key, "created secret");
        Ok(created)
    }

    /// Create each record in order, stopping at the first failure.
    ///
    /// Records created before the failure stay created.
    ///
    /// # Errors
    ///
    /// Returns the first [`ManagerError::Gateway`] encountered.
    pub async fn create_many(
        &self,
        records: &[SecretRecord],
    ) -> Result<Vec<SecretRecord>, ManagerError> {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            created.push(
                self.create_secret(&record.key, &record.value, &record.note)
                    .await?,
            );
        }
        Ok(created)
    }

    /// Replace the local cache with the vault's current contents.
    ///
    /// The full list is fetched before anything is written, so a failed
    /// fetch leaves the previous snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Gateway`] if fetching fails or
    /// [`ManagerError::Cache`] if the snapshot cannot be written.
    pub async fn sync_to_cache(&self) -> Result<usize, ManagerError> {
        let records = self.list_secrets().await?;
        self.cache.sync(&records).await?;
        Ok(records.len())
    }

    /// Load the local cache, keyed by secret name.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Cache`], including
    /// [`crate::error::CacheError::NotSynced`] when no sync has happened.
    pub async fn local_secrets(&self) -> Result<RecordIndex, ManagerError> {
        Ok(self.cache.load().await?)
    }
}
