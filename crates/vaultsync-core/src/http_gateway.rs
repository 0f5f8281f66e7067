//! HTTP implementation of [`VaultGateway`].
//!
//! Talks JSON to the vault REST API with the access token as a bearer
//! credential. Calls are never retried; the caller decides what a failure
//! means.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::{GatewayConfig, VaultGateway};
use crate::record::{SecretRecord, SecretSummary};

/// Listing bodies come either wrapped in `data` or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryList {
    Wrapped { data: Vec<SecretSummary> },
    Bare(Vec<SecretSummary>),
}

impl SummaryList {
    fn into_vec(self) -> Vec<SecretSummary> {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSecretBody<'a> {
    key: &'a str,
    value: &'a str,
    note: &'a str,
    project_ids: &'a [String],
}

/// Bearer-token JSON client for the remote vault.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Build a client from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the HTTP client cannot be
    /// built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("vaultsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::InvalidConfig {
                reason: format!("failed to build http client: {e}"),
            })?;

        debug!(
            api_url = %config.api_url(),
            identity_url = %config.identity_url(),
            "http gateway ready"
        );
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url())
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        req.bearer_auth(self.config.access_token())
            .send()
            .await
            .map_err(|e| GatewayError::Remote {
                reason: if e.is_timeout() {
                    "request timed out".to_owned()
                } else {
                    e.without_url().to_string()
                },
            })
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GatewayError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Remote {
                reason: status_reason(status, &body),
            });
        }

        let text = resp.text().await.map_err(|e| GatewayError::Remote {
            reason: e.without_url().to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| GatewayError::UnexpectedResponse {
            reason: e.to_string(),
        })
    }
}

/// Short error text for a non-success status, preferring the body's
/// `message` field when it has one.
fn status_reason(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned));

    match message {
        Some(message) => format!("HTTP {}: {message}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[async_trait::async_trait]
impl VaultGateway for HttpGateway {
    async fn list_secrets(
        &self,
        organization_id: &str,
    ) -> Result<Vec<SecretSummary>, GatewayError> {
        let url = self.url(&format!("/organizations/{organization_id}/secrets"));
        let resp = self.send(self.client.get(url)).await?;
        let list: SummaryList = Self::decode(resp).await?;
        Ok(list.into_vec())
    }

    async fn get_secret(&self, id: &str) -> Result<SecretRecord, GatewayError> {
        let url = self.url(&format!("/secrets/{id}"));
        let resp = self.send(self.client.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound { id: id.to_owned() });
        }
        Self::decode(resp).await
    }

    async fn create_secret(
        &self,
        organization_id: &str,
        project_ids: &[String],
        key: &str,
        value: &str,
        note: &str,
    ) -> Result<SecretRecord, GatewayError> {
        let url = self.url(&format!("/organizations/{organization_id}/secrets"));
        let body = CreateSecretBody {
            key,
            value,
            note,
            project_ids,
        };
        let resp = self.send(self.client.post(url).json(&body)).await?;
        let created: SecretRecord = Self::decode(resp).await?;
        debug!(key = %created.key, id = %created.id, "created remote secret");
        Ok(created)
    }
}
