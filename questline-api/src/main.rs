//! Questline API server binary.
//!
//! Startup order: tracing, configuration, database pool + migrations,
//! engines, router, serve with graceful shutdown.

use std::sync::Arc;

use questline_api::app::{build_router, AppState};
use questline_api::config::Config;
use questline_shared::auth::token::TokenService;
use questline_shared::db::{migrations, pool};
use questline_shared::service::{AuthService, ScoringService};
use questline_shared::store::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "questline_api=debug,questline_shared=debug,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(version = questline_shared::VERSION, "questline api starting");

    let db = pool::create_pool(config.database.clone()).await?;
    migrations::run_migrations(&db).await?;

    let store = Arc::new(PgStore::new(db));
    let tokens = TokenService::new(
        config.core.jwt_secret.as_bytes(),
        config.core.access_token_ttl,
    );
    let auth = AuthService::new(store.clone(), tokens.clone(), &config.core);
    let scoring = ScoringService::new(store, &config.core);

    let app = build_router(AppState::new(auth, scoring, tokens));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
