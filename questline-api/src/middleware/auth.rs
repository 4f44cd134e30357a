//! Bearer JWT authentication middleware.
//!
//! Validates the `Authorization: Bearer <token>` header against the token
//! service and injects the authenticated user id as a request extension.
//! Missing, malformed, expired, and otherwise invalid tokens are all 401;
//! expired tokens get a distinct message.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// The authenticated caller, available to protected handlers via
/// `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing authorization".to_string()))?;

    let mut parts = header_value.split_whitespace();
    let token = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            return Err(ApiError::Unauthorized(
                "invalid authorization header".to_string(),
            ))
        }
    };

    let claims = state.tokens.validate_access_token(token)?;

    req.extensions_mut().insert(AuthUser(claims.sub));
    Ok(next.run(req).await)
}
