//! HTTP error types for the `vaultsync` server.
//!
//! Maps domain errors from `vaultsync-core` into HTTP responses. Every error
//! variant produces a JSON body with a machine-readable `error` field and a
//! human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use vaultsync_core::error::{CacheError, GatewayError, ManagerError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The vault connection was never initialized.
    Unavailable(String),
    /// Requested resource not found.
    NotFound(String),
    /// Client sent invalid input.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { .. } => Self::NotFound(err.to_string()),
            GatewayError::InvalidConfig { .. } => Self::Unavailable(err.to_string()),
            GatewayError::Remote { .. } | GatewayError::UnexpectedResponse { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotSynced { .. } => Self::NotFound(err.to_string()),
            CacheError::Corrupt { .. }
            | CacheError::Serialization { .. }
            | CacheError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::NotFound { .. } => Self::NotFound(err.to_string()),
            ManagerError::Gateway(inner) => inner.into(),
            ManagerError::Cache(inner) => inner.into(),
        }
    }
}
