use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use model::execution::errors::ValidationError;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Request-level failures that never reach the ETL drivers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request body was not a JSON object.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Rejected request: {self}");
        (
            self.status(),
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connections still open {0:?} after shutdown was requested")]
    DrainTimeout(Duration),
}
