//! Application state and router builder.

use axum::{
    routing::{get, patch, post},
    Router,
};
use questline_shared::auth::token::TokenService;
use questline_shared::service::{AuthService, ScoringService};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{middleware, routes};

/// Shared application state, cloned into every handler via the `State`
/// extractor. The engines hold their store behind `Arc`, so cloning is
/// cheap.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub scoring: ScoringService,

    /// Used by the bearer middleware to validate access tokens.
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(auth: AuthService, scoring: ScoringService, tokens: TokenService) -> Self {
        Self {
            auth,
            scoring,
            tokens,
        }
    }
}

/// Builds the complete router.
///
/// ```text
/// /
/// ├── GET  /health                            # public
/// ├── POST /register                          # public
/// ├── POST /login                             # public
/// └── /users/                                 # bearer JWT required
///     ├── GET   /users/leaderboard
///     ├── GET   /users/:user_id/status        # self only
///     ├── PATCH /users/:user_id/task/complete # self only
///     └── PATCH /users/:user_id/referrer      # self only
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/users/leaderboard", get(routes::users::leaderboard))
        .route("/users/:user_id/status", get(routes::users::status))
        .route(
            "/users/:user_id/task/complete",
            patch(routes::users::complete_task),
        )
        .route("/users/:user_id/referrer", patch(routes::users::refer))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
