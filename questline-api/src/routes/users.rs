//! User endpoints. All of these sit behind the bearer middleware; the
//! per-user ones additionally require the path id to match the
//! authenticated caller.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use questline_shared::models::scoreboard::LeaderboardEntry;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthUser,
};

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub task: String,
}

#[derive(Debug, Deserialize)]
pub struct ReferRequest {
    pub task: String,
    pub referrer_id: Uuid,
}

/// `GET /users/:user_id/status`
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    ensure_self(auth, user_id)?;

    let status = state.scoring.get_status(user_id).await?;

    Ok(Json(json!({
        "status": "success",
        "user_id": status.user_id,
        "score": status.score,
    })))
}

/// `GET /users/leaderboard` — top ten by score descending.
pub async fn leaderboard(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let entries = state.scoring.get_leaderboard().await?;
    Ok(Json(entries))
}

/// `PATCH /users/:user_id/task/complete`
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CompleteTaskRequest>,
) -> ApiResult<Json<Value>> {
    ensure_self(auth, user_id)?;

    state.scoring.complete_task(user_id, &req.task).await?;

    Ok(Json(json!({ "status": "success" })))
}

/// `PATCH /users/:user_id/referrer`
pub async fn refer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ReferRequest>,
) -> ApiResult<Json<Value>> {
    ensure_self(auth, user_id)?;

    state
        .scoring
        .refer(user_id, req.referrer_id, &req.task)
        .await?;

    Ok(Json(json!({ "status": "success" })))
}

/// Authenticated callers may only act on their own resources.
fn ensure_self(auth: AuthUser, user_id: Uuid) -> Result<(), ApiError> {
    if auth.0 != user_id {
        return Err(ApiError::Forbidden("access denied".to_string()));
    }
    Ok(())
}
