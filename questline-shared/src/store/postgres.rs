//! Production store backed by transactional Postgres.
//!
//! Registration and token persistence need atomicity only and run as plain
//! transactions. `complete_task` and `refer` are read-then-conditionally-
//! write sequences and run under REPEATABLE READ; READ COMMITTED is not
//! enough to keep two concurrent callers from both crediting. When
//! Postgres aborts the losing transaction (SQLSTATE 40001), the winner has
//! already consumed the transition, so the conflict is reported as the
//! business outcome it implies rather than as a storage fault.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::ReferralBonuses;
use crate::error::{CoreError, CoreResult};
use crate::models::scoreboard::ScoreboardEntry;
use crate::models::task::TaskSeed;
use crate::models::user::User;
use crate::store::{CredentialStore, ScoringStore};

/// SQLSTATE for "could not serialize access due to concurrent update".
const SERIALIZATION_FAILURE: &str = "40001";

/// Postgres-backed implementation of both store capabilities.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_serialization_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE)
    )
}

/// Maps a statement error inside a REPEATABLE READ transaction: a
/// serialization conflict becomes the given business error, anything else
/// is an opaque storage failure.
fn map_conflict(operation: &'static str, lost_to: CoreError, err: sqlx::Error) -> CoreError {
    if is_serialization_conflict(&err) {
        lost_to
    } else {
        CoreError::storage(operation, err)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        seed_tasks: &[TaskSeed],
    ) -> CoreResult<Uuid> {
        const OP: &str = "create_user";

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        let (user_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING user_id",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| CoreError::storage(OP, e))?;

        for seed in seed_tasks {
            sqlx::query("INSERT INTO users_tasks (user_id, task, reward) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(&seed.name)
                .bind(seed.reward)
                .execute(&mut *tx)
                .await
                .map_err(|e| CoreError::storage(OP, e))?;
        }

        sqlx::query("INSERT INTO users_scoreboard (user_id) VALUES ($1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        tx.commit().await.map_err(|e| CoreError::storage(OP, e))?;

        Ok(user_id)
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::storage("find_user_by_email", e))?;

        Ok(user)
    }

    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO users_tokens (user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::storage("save_refresh_token", e))?;

        Ok(())
    }
}

#[async_trait]
impl ScoringStore for PgStore {
    async fn score(&self, user_id: Uuid) -> CoreResult<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT score FROM users_scoreboard WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| CoreError::storage("score", e))?;

        Ok(row.map(|(score,)| score))
    }

    async fn top_scores(&self, limit: i64) -> CoreResult<Vec<ScoreboardEntry>> {
        let entries = sqlx::query_as::<_, ScoreboardEntry>(
            "SELECT user_id, score FROM users_scoreboard ORDER BY score DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::storage("top_scores", e))?;

        Ok(entries)
    }

    async fn complete_task(&self, user_id: Uuid, task: &str) -> CoreResult<i64> {
        const OP: &str = "complete_task";

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        // Conditional flip; a missing row and an already-completed one are
        // indistinguishable here.
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE users_tasks SET complete = TRUE \
             WHERE user_id = $1 AND task = $2 AND complete = FALSE \
             RETURNING reward",
        )
        .bind(user_id)
        .bind(task)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_conflict(OP, CoreError::TaskNotFound, e))?;

        let Some((reward,)) = row else {
            return Err(CoreError::TaskNotFound);
        };

        let updated = sqlx::query("UPDATE users_scoreboard SET score = score + $1 WHERE user_id = $2")
            .bind(reward)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_conflict(OP, CoreError::TaskNotFound, e))?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::storage(OP, "scoreboard row missing for user"));
        }

        tx.commit()
            .await
            .map_err(|e| map_conflict(OP, CoreError::TaskNotFound, e))?;

        Ok(reward)
    }

    async fn refer(
        &self,
        user_id: Uuid,
        referrer_id: Uuid,
        task: &str,
        bonuses: ReferralBonuses,
    ) -> CoreResult<()> {
        const OP: &str = "refer";

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| CoreError::storage(OP, e))?;

        let row: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT referrer_id FROM users_tasks WHERE user_id = $1 AND task = $2")
                .bind(user_id)
                .bind(task)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| CoreError::storage(OP, e))?;

        match row {
            None => return Err(CoreError::TaskNotFound),
            Some((Some(_),)) => return Err(CoreError::ReferralAlreadyUsed),
            Some((None,)) => {}
        }

        let updated = sqlx::query(
            "UPDATE users_tasks SET referrer_id = $1 \
             WHERE user_id = $2 AND task = $3 AND referrer_id IS NULL",
        )
        .bind(referrer_id)
        .bind(user_id)
        .bind(task)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_conflict(OP, CoreError::ReferralAlreadyUsed, e))?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::ReferralAlreadyUsed);
        }

        for (target, bonus) in [(referrer_id, bonuses.referrer), (user_id, bonuses.referee)] {
            let credited =
                sqlx::query("UPDATE users_scoreboard SET score = score + $1 WHERE user_id = $2")
                    .bind(bonus)
                    .bind(target)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_conflict(OP, CoreError::ReferralAlreadyUsed, e))?;

            if credited.rows_affected() == 0 {
                return Err(CoreError::UserNotFound);
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_conflict(OP, CoreError::ReferralAlreadyUsed, e))?;

        Ok(())
    }
}
