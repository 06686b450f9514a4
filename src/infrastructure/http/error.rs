//! HTTP Error Handling
//!
//! ApplicationError → ApiError → `{errno, kind, error, data: null}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub kind: String,
    pub error: String,
    pub data: Option<()>,
}

/// 错误码定义（与 HTTP 状态码一致）
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const PAYLOAD_TOO_LARGE: i32 = 413;
    pub const CLIENT_CLOSED_REQUEST: i32 = 499;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub struct ApiError {
    errno: i32,
    kind: String,
    message: String,
}

impl ApiError {
    pub fn new(errno: i32, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errno,
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(errno::BAD_REQUEST, "validation_error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(errno::INTERNAL_ERROR, "internal_error", message)
    }

    pub fn errno(&self) -> i32 {
        self.errno
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.errno as u16).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(errno = self.errno, kind = %self.kind, error = %self.message, "Request failed");
        } else {
            tracing::warn!(errno = self.errno, kind = %self.kind, error = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            errno: self.errno,
            kind: self.kind,
            error: self.message,
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let code = match &e {
            ApplicationError::ValidationError(_) | ApplicationError::Speaker(_) => {
                errno::BAD_REQUEST
            }
            ApplicationError::SpeakerNotFound(_) => errno::NOT_FOUND,
            ApplicationError::BackendNotAvailable(_) => errno::CONFLICT,
            ApplicationError::NoBackendAvailable(_) => errno::SERVICE_UNAVAILABLE,
            ApplicationError::Cancelled => errno::CLIENT_CLOSED_REQUEST,
            ApplicationError::ChunkSynthesisFailed { .. }
            | ApplicationError::FormatMismatch(_)
            | ApplicationError::RepositoryError(_)
            | ApplicationError::StorageError(_)
            | ApplicationError::InternalError(_) => errno::INTERNAL_ERROR,
        };

        ApiError::new(code, e.kind(), e.to_string())
    }
}
