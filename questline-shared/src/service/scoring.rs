//! Scoring engine: status, leaderboard, task completion, referrals.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use uuid::Uuid;

use crate::config::{CoreConfig, ReferralBonuses};
use crate::error::{CoreError, CoreResult};
use crate::models::scoreboard::{LeaderboardEntry, UserStatus};
use crate::service::with_timeout;
use crate::store::ScoringStore;

/// Fixed leaderboard depth.
pub const LEADERBOARD_LIMIT: i64 = 10;

/// Enforces the scoring business rules, then delegates each mutation to
/// the store as one atomic unit.
#[derive(Clone)]
pub struct ScoringService {
    store: Arc<dyn ScoringStore>,
    bonuses: ReferralBonuses,
    op_timeout: StdDuration,
}

impl ScoringService {
    pub fn new(store: Arc<dyn ScoringStore>, config: &CoreConfig) -> Self {
        Self {
            store,
            bonuses: config.referral,
            op_timeout: config.op_timeout,
        }
    }

    /// Current cumulative score. Pure read.
    pub async fn get_status(&self, user_id: Uuid) -> CoreResult<UserStatus> {
        validate_user_id(user_id)?;

        let score = with_timeout(self.op_timeout, "get_status", self.store.score(user_id))
            .await?
            .ok_or(CoreError::UserNotFound)?;

        Ok(UserStatus { user_id, score })
    }

    /// Top ten users by score descending, ranked from 1. Ties fall in the
    /// store's stable order.
    pub async fn get_leaderboard(&self) -> CoreResult<Vec<LeaderboardEntry>> {
        let entries = with_timeout(
            self.op_timeout,
            "get_leaderboard",
            self.store.top_scores(LEADERBOARD_LIMIT),
        )
        .await?;

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardEntry {
                rank: i + 1,
                user_id: entry.user_id,
                score: entry.score,
            })
            .collect())
    }

    /// Marks a task complete and credits its reward, exactly once. An
    /// unknown task and an already-completed one both fail `TaskNotFound`.
    pub async fn complete_task(&self, user_id: Uuid, task: &str) -> CoreResult<()> {
        validate_user_id(user_id)?;
        validate_task_name(task)?;

        let reward = with_timeout(
            self.op_timeout,
            "complete_task",
            self.store.complete_task(user_id, task),
        )
        .await?;

        tracing::info!(%user_id, task, reward, "task completed");
        Ok(())
    }

    /// Records a one-time referral on a task and credits referrer and
    /// referee, exactly once per task.
    pub async fn refer(&self, user_id: Uuid, referrer_id: Uuid, task: &str) -> CoreResult<()> {
        validate_user_id(user_id)?;
        validate_user_id(referrer_id)?;
        if user_id == referrer_id {
            return Err(CoreError::SelfReferral);
        }
        validate_task_name(task)?;

        with_timeout(
            self.op_timeout,
            "refer",
            self.store.refer(user_id, referrer_id, task, self.bonuses),
        )
        .await?;

        tracing::info!(%user_id, %referrer_id, task, "referral credited");
        Ok(())
    }
}

fn validate_user_id(user_id: Uuid) -> CoreResult<()> {
    if user_id.is_nil() {
        return Err(CoreError::Validation("empty user_id".to_string()));
    }
    Ok(())
}

fn validate_task_name(task: &str) -> CoreResult<()> {
    if task.is_empty() {
        return Err(CoreError::Validation("empty task".to_string()));
    }
    Ok(())
}
