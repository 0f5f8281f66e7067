//! Secrets routes: `/secrets` and `/secrets/{name}`.
//!
//! Every handler goes through the remote vault; nothing here reads the
//! local cache.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use vaultsync_core::SecretRecord;

use crate::error::AppError;
use crate::state::AppState;

/// Maximum key length, in characters.
const MAX_KEY_CHARS: usize = 100;
/// Maximum note length, in characters.
const MAX_NOTE_CHARS: usize = 500;

/// Build the secrets router.
///
/// Paths:
/// - `GET  /secrets`: list every secret with its value
/// - `POST /secrets`: create a secret
/// - `GET  /secrets/{name}`: fetch one secret by key
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/secrets", get(list_secrets).post(create_secret))
        .route("/secrets/{name}", get(get_secret))
}

// ── Request / response types ─────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSecretRequest {
    pub key: String,
    pub value: String,
    #[serde(deserialize_with = "vaultsync_core::record::null_as_empty")]
    pub note: String,
}

impl CreateSecretRequest {
    fn validate(&self) -> Result<(), AppError> {
        let key_chars = self.key.chars().count();
        if key_chars == 0 || key_chars > MAX_KEY_CHARS {
            return Err(AppError::BadRequest(format!(
                "key must be between 1 and {MAX_KEY_CHARS} characters"
            )));
        }
        if self.value.is_empty() {
            return Err(AppError::BadRequest("value must not be empty".to_owned()));
        }
        if self.note.chars().count() > MAX_NOTE_CHARS {
            return Err(AppError::BadRequest(format!(
                "note must be at most {MAX_NOTE_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SecretListResponse {
    pub secrets: Vec<SecretRecord>,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn get_secret(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SecretRecord>, AppError> {
    let record = state.manager()?.get_secret(&name).await?;
    Ok(Json(record))
}

async fn create_secret(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSecretRequest>,
) -> Result<(StatusCode, Json<SecretRecord>), AppError> {
    body.validate()?;
    let created = state
        .manager()?
        .create_secret(&body.key, &body.value, &body.note)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_secrets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SecretListResponse>, AppError> {
    let secrets = state.manager()?.list_secrets().await?;
    Ok(Json(SecretListResponse { secrets }))
}
