//! Cache routes: `POST /sync` and `GET /local-secrets`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use vaultsync_core::RecordIndex;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    // One sync at a time; concurrent requests queue.
    let sync = Router::new()
        .route("/sync", post(sync_secrets))
        .layer(tower::limit::ConcurrencyLimitLayer::new(1));

    Router::new()
        .merge(sync)
        .route("/local-secrets", get(local_secrets))
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct LocalSecretsResponse {
    pub secrets: RecordIndex,
}

async fn sync_secrets(State(state): State<Arc<AppState>>) -> Result<Json<SyncResponse>, AppError> {
    let count = state.manager()?.sync_to_cache().await?;
    Ok(Json(SyncResponse {
        message: format!("Synced {count} secrets to local cache"),
        count,
    }))
}

/// Served straight from the cache, so it works without a vault connection.
async fn local_secrets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LocalSecretsResponse>, AppError> {
    let secrets = state.cache.load().await?;
    Ok(Json(LocalSecretsResponse { secrets }))
}
