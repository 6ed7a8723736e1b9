//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::models::ErrorResponse;

/// Error type for HTTP handlers. Every variant renders as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid request body.
    Validation(String),
    NotFound(String),
    /// Anything that went wrong while processing a valid request.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected request body");
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::Validation(d) | Self::NotFound(d) | Self::Internal(d) => d,
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
