/// Unified error types for Stridelog
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a sign-in token was rejected.
///
/// Distinguished internally for logging; collapsed to a single generic
/// client message so the failure mode is not leaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No token record with that value
    Unknown,
    /// Token was already consumed
    AlreadyUsed,
    /// Token passed its expiry instant
    Expired,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenRejection::Unknown => "unknown",
            TokenRejection::AlreadyUsed => "already used",
            TokenRejection::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors (client's fault, not retryable as-is)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Sign-in token rejected (unknown, already used, or expired)
    #[error("Sign-in token rejected: {0}")]
    TokenRejected(TokenRejection),

    /// Email delivery failures
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            // All three rejection classes get the same user-facing message.
            AppError::TokenRejected(_) => (
                StatusCode::UNAUTHORIZED,
                "InvalidSignInLink",
                "Invalid sign-in link. Please request a new one.".to_string(),
            ),
            AppError::Delivery(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DeliveryFailed",
                "Failed to send sign-in email. Please try again.".to_string(),
            ),
            AppError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "RateLimitExceeded",
                "Rate limit exceeded".to_string(),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            AppError::Database(_) | AppError::Internal(_) | AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;
