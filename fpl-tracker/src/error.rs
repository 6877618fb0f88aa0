//! Error types for fpl-tracker

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::FetchError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream data needed for the whole response was unavailable (500)
    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Upstream(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_UNAVAILABLE",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
