//! API error handling for depot.
//!
//! Every failure renders as `{"error": "<message>"}` with a short, fixed
//! message per category. Filesystem paths and underlying error text stay in
//! the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthError, PermissionError};
use crate::storage::{PathError, StorageError};

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Payload too large (413).
    PayloadTooLarge,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Map a storage failure, using `message` for anything but a missing path.
    pub fn storage(err: &StorageError, message: impl Into<String>) -> Self {
        match err {
            StorageError::NotFound(_) => Self::not_found("not found"),
            StorageError::Io { .. } => Self::internal(message),
        }
    }

    /// Error code of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: self.message,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::unauthorized("Unauthorized")
    }
}

impl From<PermissionError> for ApiError {
    fn from(_: PermissionError) -> Self {
        ApiError::forbidden("forbidden")
    }
}

impl From<PathError> for ApiError {
    fn from(_: PathError) -> Self {
        ApiError::bad_request("bad path")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::storage(&err, "storage error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::WrongScheme).code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            ApiError::from(PermissionError::NotPermitted {
                user: "bob".to_string(),
                project: "proj1".to_string(),
            })
            .code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            ApiError::from(PathError::Traversal("..".to_string())).code(),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ApiError::from(StorageError::NotFound(PathBuf::from("/x"))).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(StorageError::Io {
                path: PathBuf::from("/x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
            })
            .code(),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn test_messages_do_not_leak_paths() {
        let err = ApiError::from(PermissionError::Unreadable {
            path: PathBuf::from("/srv/depot/users/alice/projects"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        assert_eq!(err.message(), "forbidden");

        let err = ApiError::storage(
            &StorageError::Io {
                path: PathBuf::from("/srv/depot/data/p/f"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            },
            "failed to retrieve file",
        );
        assert_eq!(err.message(), "failed to retrieve file");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::forbidden("forbidden").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "forbidden"}));
    }
}
