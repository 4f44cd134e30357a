//! Authentication endpoints.
//!
//! - `POST /register` — create an account (seeds the default tasks and a
//!   zero-score scoreboard row)
//! - `POST /login` — verify credentials and issue an access/refresh pair

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::{app::AppState, error::ApiResult, routes::validate_request};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 100, message = "password must be 8-100 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed access token, valid for 15 minutes.
    pub access_token: String,

    /// Raw refresh secret; persisted server-side only as a hash.
    pub refresh_token: String,
}

/// Registers a new user.
///
/// Returns `201` on success; validation problems are `422`, everything
/// else that keeps the registration from committing is `400`.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_request(&req)?;

    state.auth.register(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))))
}

/// Authenticates a user and returns a token pair.
///
/// The refresh record is persisted before anything is returned; wrong
/// password and unknown email are the same `401`.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate_request(&req)?;

    let user = state.auth.login(&req.email, &req.password).await?;
    let pair = state.auth.issue_tokens(user.user_id).await?;

    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}
