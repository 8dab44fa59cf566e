//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::upload::UploadError;
use crate::services::video_repo::RepositoryError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status_code(),
            ApiError::Internal(_) | ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            ApiError::Upload(e) => Some(e.code().to_string()),
            _ => None,
        }
    }

    /// Message safe to return to an untrusted caller.
    fn public_detail(&self) -> String {
        match self {
            ApiError::Upload(e) => e.public_message(),
            ApiError::Internal(_) | ApiError::Repository(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal causes are logged, never echoed.
        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", self);
        }

        let body = ErrorResponse {
            detail: self.public_detail(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
