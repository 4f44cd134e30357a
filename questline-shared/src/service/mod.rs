//! Business engines.
//!
//! [`auth::AuthService`] and [`scoring::ScoringService`] are the only
//! components with business logic and the only entry points the adapter
//! layer may call. All coordination is delegated to the store; the engines
//! hold no locks and spawn nothing.

use std::future::Future;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub mod auth;
pub mod scoring;

pub use auth::AuthService;
pub use scoring::ScoringService;

/// Bounds a store operation by the configured budget. On expiry the future
/// is dropped, which rolls back any in-flight transaction, and a timeout
/// error distinct from business errors is reported.
pub(crate) async fn with_timeout<T>(
    budget: Duration,
    operation: &'static str,
    fut: impl Future<Output = CoreResult<T>>,
) -> CoreResult<T> {
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(CoreError::Timeout { operation }),
    }
}
