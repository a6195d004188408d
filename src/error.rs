//! Error types for Reelgraph
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` so handlers can return it directly.
//! The response body is always the `{status_code, status_msg}` envelope
//! clients of the short-video API expect.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Wire status code for a successful call
pub const SUCCESS_CODE: i32 = 0;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input (400)
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// Referenced entity is absent (404)
    #[error("Resource not found")]
    NotFound,

    /// Anonymous viewer on an operation that requires one (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Registration with a username that is already taken (409)
    #[error("User already exists")]
    UserAlreadyExists,

    /// Any fault below the store boundary (500)
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal fault, including broken caller contracts (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Wire `status_code` for this error
    pub fn status_code(&self) -> i32 {
        match self {
            AppError::InvalidParam(_) => 10002,
            AppError::UserAlreadyExists => 10003,
            AppError::Unauthorized => 10004,
            AppError::NotFound => 10005,
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => 10001,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidParam(_) => "invalid_param",
            AppError::NotFound => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::UserAlreadyExists => "user_already_exists",
            AppError::Storage(_) => "storage",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each variant to an HTTP status and fills the envelope with the
    /// wire status code. Storage and internal details are not leaked.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, message) = match &self {
            AppError::InvalidParam(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::UserAlreadyExists => (StatusCode::CONFLICT, self.to_string()),
            AppError::Storage(error) => {
                tracing::error!(%error, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(error) => {
                tracing::error!(%error, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.error_type()])
            .inc();

        let body = Json(serde_json::json!({
            "status_code": self.status_code(),
            "status_msg": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
