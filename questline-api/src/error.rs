//! Error handling for the API server.
//!
//! Handlers return `ApiResult<T>`; [`ApiError`] converts the core taxonomy
//! into HTTP responses. Infrastructure failures are logged here and kept
//! opaque to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use questline_shared::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403) - acting on another user's resources
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g. referral already used
    Conflict(String),

    /// Unprocessable entity (422) - request validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Gateway timeout (504) - a store operation ran out of budget
    GatewayTimeout(String),
}

/// Validation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code, e.g. "bad_request", "unauthorized".
    pub error: String,

    /// Human-readable message.
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "internal error: {}", msg),
            ApiError::GatewayTimeout(msg) => write!(f, "gateway timeout: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internals, expose nothing.
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::GatewayTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout", msg, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::InvalidCredentials => {
                ApiError::Unauthorized("wrong email or password".to_string())
            }
            CoreError::TokenExpired => ApiError::Unauthorized("token expired".to_string()),
            CoreError::TokenInvalid => ApiError::Unauthorized("invalid token".to_string()),
            CoreError::UserNotFound => ApiError::NotFound("user not found".to_string()),
            CoreError::TaskNotFound => ApiError::NotFound("task not found".to_string()),
            CoreError::SelfReferral => {
                ApiError::BadRequest("referrer_id cannot be the same as user_id".to_string())
            }
            CoreError::ReferralAlreadyUsed => {
                ApiError::Conflict("referral already used for this task".to_string())
            }
            err @ CoreError::RegistrationFailed { .. } => {
                tracing::warn!(error = ?err, "registration failed");
                ApiError::BadRequest("registration failed".to_string())
            }
            err @ (CoreError::TokenPersistence { .. } | CoreError::Storage { .. }) => {
                ApiError::InternalError(format!("{:?}", err))
            }
            err @ CoreError::Timeout { .. } => ApiError::GatewayTimeout(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "bad request: invalid input");
    }

    #[test]
    fn test_core_taxonomy_mapping() {
        assert!(matches!(
            ApiError::from(CoreError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(CoreError::TaskNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(CoreError::ReferralAlreadyUsed),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(CoreError::Timeout { operation: "refer" }),
            ApiError::GatewayTimeout(_)
        ));
        assert!(matches!(
            ApiError::from(CoreError::storage("score", "boom")),
            ApiError::InternalError(_)
        ));
    }
}
