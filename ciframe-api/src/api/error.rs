//! Request-level errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::engine::similarity::ResolveError;
use crate::gate::GateError;
use crate::service::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// `pagina` is not a positive integer
    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    /// Direct lookup of an unknown song
    #[error("Song not found: {0}")]
    NotFound(String),

    /// Similarity reference names an unknown song
    #[error("Unknown song id: {0}")]
    UnknownReference(String),

    /// Gave up waiting for a similarity slot
    #[error("Similarity search busy: {0}")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Resolve(ResolveError::UnknownSong(id)) => ApiError::UnknownReference(id),
            ServiceError::Gate(e @ GateError::Timeout(_)) => ApiError::Busy(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidPage(_) | ApiError::UnknownReference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
