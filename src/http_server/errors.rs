//! # HTTP API Errors
//!
//! Maps table outcomes onto status codes:
//! - validation and unreadable bodies → 400
//! - not found → 404
//! - storage and malformed data → 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::table::{TableError, TableErrorCode};

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing or empty required field
    #[error("{0}")]
    Validation(String),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No cat with the requested id
    #[error("Cat not found")]
    NotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failure (I/O or corrupt table)
    #[error("{0}")]
    Table(TableError),

    /// Blocking task failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Table(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients. Server-side details stay in the log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Table(err) => format!("Internal error ({})", err.code()),
            ApiError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        match err.code() {
            TableErrorCode::ValidationFailed => ApiError::Validation(err.to_string()),
            _ => ApiError::Table(err),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            let detail = self.to_string();
            log_event_with_fields(
                Event::RequestFailed,
                &[("status", status.as_str()), ("detail", &detail)],
            );
        }

        let body = Json(ErrorResponse {
            error: self.public_message(),
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}
