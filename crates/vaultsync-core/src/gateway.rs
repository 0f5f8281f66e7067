//! Remote vault gateway.
//!
//! The [`VaultGateway`] trait is the only view the rest of the crate has of
//! the remote vault: list summaries, fetch one secret, create a secret. The
//! concrete protocol lives behind it ([`crate::http_gateway::HttpGateway`]
//! in production, [`crate::memory_gateway::MemoryGateway`] in tests).
//!
//! [`GatewayConfig`] carries the identifiers every call needs. It is
//! validated when it is built, so an owned config is always usable.

use std::time::Duration;

use crate::error::GatewayError;
use crate::record::{SecretRecord, SecretSummary};

/// Default vault API base URL.
pub const DEFAULT_API_URL: &str = "https://api.bitwarden.com";
/// Default vault identity base URL.
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.bitwarden.com";
/// Default per-request timeout for remote calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the core needs from a remote secret vault.
///
/// Every call may fail; failures surface as [`GatewayError`] and are never
/// retried here.
#[async_trait::async_trait]
pub trait VaultGateway: Send + Sync + 'static {
    /// List `{id, key}` summaries of every secret in the organization.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Remote`] or [`GatewayError::UnexpectedResponse`].
    async fn list_secrets(
        &self,
        organization_id: &str,
    ) -> Result<Vec<SecretSummary>, GatewayError>;

    /// Fetch one secret with its value and note.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the id is unknown, otherwise
    /// [`GatewayError::Remote`] or [`GatewayError::UnexpectedResponse`].
    async fn get_secret(&self, id: &str) -> Result<SecretRecord, GatewayError>;

    /// Create a secret and return it with its vault-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Remote`] or [`GatewayError::UnexpectedResponse`].
    async fn create_secret(
        &self,
        organization_id: &str,
        project_ids: &[String],
        key: &str,
        value: &str,
        note: &str,
    ) -> Result<SecretRecord, GatewayError>;
}

/// Validated connection settings for the remote vault.
#[derive(Clone)]
pub struct GatewayConfig {
    access_token: String,
    organization_id: String,
    project_id: String,
    api_url: String,
    identity_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("access_token", &"[redacted]")
            .field("organization_id", &self.organization_id)
            .field("project_id", &self.project_id)
            .field("api_url", &self.api_url)
            .field("identity_url", &self.identity_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Build a config from the three required settings.
    ///
    /// The organization and project ids must be UUIDs; they are normalized
    /// to lowercase hyphenated form.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if any setting is empty or
    /// an id is not a UUID.
    pub fn new(
        access_token: impl Into<String>,
        organization_id: &str,
        project_id: &str,
    ) -> Result<Self, GatewayError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(invalid("access token is required (BW_ACCESS_TOKEN)"));
        }

        Ok(Self {
            access_token,
            organization_id: parse_uuid("organization id", "ORGANIZATION_ID", organization_id)?,
            project_id: parse_uuid("project id", "BW_PROJECT_ID", project_id)?,
            api_url: DEFAULT_API_URL.to_owned(),
            identity_url: DEFAULT_IDENTITY_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Load the config from process environment variables.
    ///
    /// - `BW_ACCESS_TOKEN`: required
    /// - `ORGANIZATION_ID`: required UUID
    /// - `BW_PROJECT_ID`: required UUID
    /// - `BW_API_URL`: default [`DEFAULT_API_URL`]
    /// - `BW_IDENTITY_URL`: default [`DEFAULT_IDENTITY_URL`]
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] as for [`GatewayConfig::new`].
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the config through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] as for [`GatewayConfig::new`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GatewayError> {
        let mut config = Self::new(
            lookup("BW_ACCESS_TOKEN").unwrap_or_default(),
            &lookup("ORGANIZATION_ID").unwrap_or_default(),
            &lookup("BW_PROJECT_ID").unwrap_or_default(),
        )?;

        if let Some(url) = lookup("BW_API_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_api_url(url);
        }
        if let Some(url) = lookup("BW_IDENTITY_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_identity_url(url);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn invalid(reason: impl Into<String>) -> GatewayError {
    GatewayError::InvalidConfig {
        reason: reason.into(),
    }
}

fn parse_uuid(label: &str, var: &str, raw: &str) -> Result<String, GatewayError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid(format!("{label} is required ({var})")));
    }
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|e| invalid(format!("{label} must be a valid UUID: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ORG: &str = "3F2504E0-4F89-11D3-9A0C-0305E82C3301";
    const PROJECT: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn valid_config_normalizes_ids() {
        let config = GatewayConfig::new("token", ORG, PROJECT).unwrap();
        assert_eq!(config.organization_id(), "3f2504e0-4f89-11d3-9a0c-0305e82c3301");
        assert_eq!(config.project_id(), PROJECT);
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = GatewayConfig::new("  ", ORG, PROJECT).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig { .. }));
        assert!(err.to_string().contains("BW_ACCESS_TOKEN"));
    }

    #[test]
    fn missing_organization_is_rejected() {
        let err = GatewayConfig::new("token", "", PROJECT).unwrap_err();
        assert!(err.to_string().contains("ORGANIZATION_ID"));
    }

    #[test]
    fn malformed_project_is_rejected() {
        let err = GatewayConfig::new("token", ORG, "not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("project id must be a valid UUID"));
    }

    #[test]
    fn from_lookup_reads_urls_and_trims_slashes() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("BW_ACCESS_TOKEN", "token"),
            ("ORGANIZATION_ID", ORG),
            ("BW_PROJECT_ID", PROJECT),
            ("BW_API_URL", "http://localhost:9000/"),
        ]))
        .unwrap();

        assert_eq!(config.api_url(), "http://localhost:9000");
        assert_eq!(config.identity_url(), DEFAULT_IDENTITY_URL);
    }

    #[test]
    fn debug_redacts_token() {
        let config = GatewayConfig::new("super-secret-token", ORG, PROJECT).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("[redacted]"));
    }
}
