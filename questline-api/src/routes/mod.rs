//! HTTP route handlers.
//!
//! - `auth`: registration and login (public)
//! - `users`: status, leaderboard, task completion, referrals (bearer auth)
//! - `health`: liveness probe

pub mod auth;
pub mod health;
pub mod users;

use crate::error::{ApiError, ValidationErrorDetail};
use validator::Validate;

/// Runs `validator` derive rules on a request body, flattening field
/// errors into the API error shape.
pub(crate) fn validate_request<T: Validate>(req: &T) -> Result<(), ApiError> {
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })
}
