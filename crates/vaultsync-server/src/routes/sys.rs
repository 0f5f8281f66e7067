//! Service routes: `/` and `/health`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "vaultsync secret manager API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Healthy only once the vault connection is initialized.
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    state.manager()?;
    Ok(Json(HealthResponse { status: "healthy" }))
}
