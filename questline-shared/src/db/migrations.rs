//! Embedded migration runner.
//!
//! Migration files live in `migrations/` at the workspace root, one pair
//! per change: `{version}_{name}.up.sql` and `{version}_{name}.down.sql`.
//! They are compiled into the binary, so deployments carry their schema.

use sqlx::PgPool;
use tracing::info;

/// Applies all pending migrations. Safe to run on every startup; already-
/// applied versions are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("database schema up to date");
    Ok(())
}
