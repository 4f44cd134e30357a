//! Storage capabilities consumed by the engines.
//!
//! Two abstract interfaces with exactly one production implementation
//! ([`PgStore`], transactional Postgres) and one in-memory fake for tests
//! ([`MemoryStore`]). The multi-step conditional mutations are single
//! methods here so the transaction boundary is owned by the store; the
//! engines never see a half-applied operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ReferralBonuses;
use crate::error::CoreResult;
use crate::models::scoreboard::ScoreboardEntry;
use crate::models::task::TaskSeed;
use crate::models::user::User;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Identity persistence: users, email uniqueness, refresh-token records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Creates the user row, seeds the given tasks (all incomplete), and
    /// creates the zero-score scoreboard row, as one atomic unit. Partial
    /// creation is never observable.
    ///
    /// Returns the generated user id.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        seed_tasks: &[TaskSeed],
    ) -> CoreResult<Uuid>;

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    /// Appends a refresh-token record. Earlier records for the same user
    /// stay live; there is no revocation in scope.
    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;
}

/// Score persistence: scoreboard reads and the two conditional,
/// exactly-once mutations.
#[async_trait]
pub trait ScoringStore: Send + Sync {
    /// Current score, or `None` when the user has no scoreboard row.
    async fn score(&self, user_id: Uuid) -> CoreResult<Option<i64>>;

    /// Top `limit` rows by score descending.
    async fn top_scores(&self, limit: i64) -> CoreResult<Vec<ScoreboardEntry>>;

    /// Flips the task's `complete` flag false → true and credits its
    /// reward to the user's score, atomically. Fails `TaskNotFound` when
    /// no row matches — a missing task and an already-completed one are
    /// indistinguishable by design. Exactly one concurrent caller wins.
    ///
    /// Returns the reward that was credited.
    async fn complete_task(&self, user_id: Uuid, task: &str) -> CoreResult<i64>;

    /// Sets the task's referrer (once only) and credits both bonuses,
    /// atomically. Fails `TaskNotFound` when the row is missing and
    /// `ReferralAlreadyUsed` when a referrer is already set, including
    /// when a concurrent caller set it first.
    async fn refer(
        &self,
        user_id: Uuid,
        referrer_id: Uuid,
        task: &str,
        bonuses: ReferralBonuses,
    ) -> CoreResult<()>;
}
