//! API error types
//!
//! Every rejection renders as a structured JSON body; nothing throws
//! across the HTTP boundary. Authorization and state failures keep their
//! deliberately generic protocol messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use pact_core::error::{PactError, PactErrorKind};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error(transparent)]
    Protocol(#[from] PactError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHORIZED",
                "Not authorized".to_string(),
            ),
            ApiError::Protocol(err) => match err.kind() {
                PactErrorKind::Validation => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                PactErrorKind::NotAuthorized => (
                    StatusCode::FORBIDDEN,
                    "NOT_AUTHORIZED",
                    "Not authorized".to_string(),
                ),
                PactErrorKind::NotAvailable => (
                    StatusCode::CONFLICT,
                    "DEAL_NOT_AVAILABLE",
                    "Deal not available".to_string(),
                ),
                PactErrorKind::NotFound => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                PactErrorKind::VerificationRequired => (
                    StatusCode::FORBIDDEN,
                    "CANNOT_SIGN",
                    "Deal cannot be signed yet".to_string(),
                ),
                PactErrorKind::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "Too many requests".to_string(),
                ),
                PactErrorKind::OriginRejected => (
                    StatusCode::FORBIDDEN,
                    "ORIGIN_REJECTED",
                    "Origin not allowed".to_string(),
                ),
                PactErrorKind::Notification => (
                    StatusCode::BAD_GATEWAY,
                    "NOTIFICATION_ERROR",
                    "Notification delivery failed".to_string(),
                ),
                PactErrorKind::Storage | PactErrorKind::Serialization => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                ),
            },
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;
