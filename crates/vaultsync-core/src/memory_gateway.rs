//! In-memory [`VaultGateway`] for tests and offline demos.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::GatewayError;
use crate::gateway::VaultGateway;
use crate::record::{SecretRecord, SecretSummary};

#[derive(Debug, Clone)]
struct StoredSecret {
    organization_id: String,
    record: SecretRecord,
}

/// Vault that lives in a vector, in creation order.
///
/// Clones share the same store. Setting [`MemoryGateway::set_offline`]
/// makes every call fail with [`GatewayError::Remote`], which is how tests
/// simulate an unreachable vault.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    secrets: Arc<RwLock<Vec<StoredSecret>>>,
    offline: Arc<RwLock<bool>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, keeping its id (one is assigned if empty).
    pub async fn seed(&self, organization_id: &str, record: SecretRecord) -> SecretRecord {
        let record = if record.id.is_empty() {
            record.with_id(uuid::Uuid::new_v4().to_string())
        } else {
            record
        };
        self.secrets.write().await.push(StoredSecret {
            organization_id: organization_id.to_owned(),
            record: record.clone(),
        });
        record
    }

    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    /// Number of stored secrets across all organizations.
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }

    async fn ensure_online(&self) -> Result<(), GatewayError> {
        if *self.offline.read().await {
            return Err(GatewayError::Remote {
                reason: "vault unreachable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl VaultGateway for MemoryGateway {
    async fn list_secrets(
        &self,
        organization_id: &str,
    ) -> Result<Vec<SecretSummary>, GatewayError> {
        self.ensure_online().await?;
        Ok(self
            .secrets
            .read()
            .await
            .iter()
            .filter(|s| s.organization_id == organization_id)
            .map(|s| SecretSummary {
                id: s.record.id.clone(),
                key: s.record.key.clone(),
            })
            .collect())
    }

    async fn get_secret(&self, id: &str) -> Result<SecretRecord, GatewayError> {
        self.ensure_online().await?;
        self.secrets
            .read()
            .await
            .iter()
            .find(|s| s.record.id == id)
            .map(|s| s.record.clone())
            .ok_or_else(|| GatewayError::NotFound { id: id.to_owned() })
    }

    async fn create_secret(
        &self,
        organization_id: &str,
        _project_ids: &[String],
        key: &str,
        value: &str,
        note: &str,
    ) -> Result<SecretRecord, GatewayError> {
        self.ensure_online().await?;
        Ok(self
            .seed(organization_id, SecretRecord::new(key, value, note))
            .await)
    }
}
