//! In-memory store fake for tests.
//!
//! Every operation takes the single mutex for its whole duration, which
//! makes the fake trivially serializable — the concurrency properties the
//! Postgres store enforces with REPEATABLE READ hold here by construction.
//! Intended for unit and integration tests only.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ReferralBonuses;
use crate::error::{CoreError, CoreResult};
use crate::models::scoreboard::ScoreboardEntry;
use crate::models::task::{TaskSeed, UserTask};
use crate::models::user::{RefreshTokenRecord, User};
use crate::store::{CredentialStore, ScoringStore};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tasks: HashMap<(Uuid, String), UserTask>,
    scores: HashMap<Uuid, i64>,
    refresh_tokens: Vec<RefreshTokenRecord>,
}

/// Mutex-serialized fake implementing both store capabilities.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: the stored refresh-token records for a user.
    pub fn refresh_tokens_for(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.lock()
            .refresh_tokens
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Test hook: a task row as stored.
    pub fn task(&self, user_id: Uuid, task: &str) -> Option<UserTask> {
        self.lock().tasks.get(&(user_id, task.to_string())).cloned()
    }

    /// Test hook: every task row belonging to a user.
    pub fn tasks_for(&self, user_id: Uuid) -> Vec<UserTask> {
        self.lock()
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        seed_tasks: &[TaskSeed],
    ) -> CoreResult<Uuid> {
        let mut inner = self.lock();

        if inner.users.values().any(|u| u.email == email) {
            return Err(CoreError::storage("create_user", "email already exists"));
        }

        let user_id = Uuid::new_v4();
        inner.users.insert(
            user_id,
            User {
                user_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );

        for seed in seed_tasks {
            inner.tasks.insert(
                (user_id, seed.name.clone()),
                UserTask {
                    user_id,
                    task: seed.name.clone(),
                    reward: seed.reward,
                    complete: false,
                    referrer_id: None,
                },
            );
        }

        inner.scores.insert(user_id, 0);

        Ok(user_id)
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.lock().refresh_tokens.push(RefreshTokenRecord {
            user_id,
            refresh_token_hash: token_hash.to_string(),
            expires_at,
        });

        Ok(())
    }
}

#[async_trait]
impl ScoringStore for MemoryStore {
    async fn score(&self, user_id: Uuid) -> CoreResult<Option<i64>> {
        Ok(self.lock().scores.get(&user_id).copied())
    }

    async fn top_scores(&self, limit: i64) -> CoreResult<Vec<ScoreboardEntry>> {
        let mut entries: Vec<ScoreboardEntry> = self
            .lock()
            .scores
            .iter()
            .map(|(&user_id, &score)| ScoreboardEntry { user_id, score })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit.max(0) as usize);

        Ok(entries)
    }

    async fn complete_task(&self, user_id: Uuid, task: &str) -> CoreResult<i64> {
        let mut inner = self.lock();

        let reward = match inner.tasks.get_mut(&(user_id, task.to_string())) {
            Some(row) if !row.complete => {
                row.complete = true;
                row.reward
            }
            // Missing and already-completed are deliberately the same.
            _ => return Err(CoreError::TaskNotFound),
        };

        match inner.scores.get_mut(&user_id) {
            Some(score) => *score += reward,
            None => {
                return Err(CoreError::storage(
                    "complete_task",
                    "scoreboard row missing for user",
                ))
            }
        }

        Ok(reward)
    }

    async fn refer(
        &self,
        user_id: Uuid,
        referrer_id: Uuid,
        task: &str,
        bonuses: ReferralBonuses,
    ) -> CoreResult<()> {
        let mut inner = self.lock();
        let key = (user_id, task.to_string());

        match inner.tasks.get(&key) {
            None => return Err(CoreError::TaskNotFound),
            Some(row) if row.referrer_id.is_some() => return Err(CoreError::ReferralAlreadyUsed),
            Some(_) => {}
        }

        // Nothing is mutated until both credit targets are known to exist.
        if !inner.scores.contains_key(&referrer_id) || !inner.scores.contains_key(&user_id) {
            return Err(CoreError::UserNotFound);
        }

        inner.tasks.get_mut(&key).expect("checked above").referrer_id = Some(referrer_id);
        *inner.scores.get_mut(&referrer_id).expect("checked above") += bonuses.referrer;
        *inner.scores.get_mut(&user_id).expect("checked above") += bonuses.referee;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds() -> Vec<TaskSeed> {
        crate::config::default_task_catalog()
    }

    #[tokio::test]
    async fn test_create_user_seeds_tasks_and_scoreboard() {
        let store = MemoryStore::new();
        let user_id = store
            .create_user("a@x.com", "hash", &seeds())
            .await
            .unwrap();

        let tasks = store.tasks_for(user_id);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| !t.complete && t.reward == 150));
        assert_eq!(store.score(user_id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user("a@x.com", "hash", &[]).await.unwrap();

        let err = store.create_user("a@x.com", "hash", &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_complete_task_credits_once() {
        let store = MemoryStore::new();
        let user_id = store
            .create_user("a@x.com", "hash", &seeds())
            .await
            .unwrap();
        let task = "subscribe to 'telegram' channel/group";

        assert_eq!(store.complete_task(user_id, task).await.unwrap(), 150);
        assert_eq!(store.score(user_id).await.unwrap(), Some(150));

        let err = store.complete_task(user_id, task).await.unwrap_err();
        assert!(matches!(err, CoreError::TaskNotFound));
        assert_eq!(store.score(user_id).await.unwrap(), Some(150));
    }

    #[tokio::test]
    async fn test_refer_sets_referrer_once() {
        let store = MemoryStore::new();
        let user = store.create_user("a@x.com", "h", &seeds()).await.unwrap();
        let referrer = store.create_user("b@x.com", "h", &seeds()).await.unwrap();
        let other = store.create_user("c@x.com", "h", &seeds()).await.unwrap();
        let task = "subscribe to 'instagram' account";
        let bonuses = ReferralBonuses::default();

        store.refer(user, referrer, task, bonuses).await.unwrap();
        assert_eq!(store.score(referrer).await.unwrap(), Some(100));
        assert_eq!(store.score(user).await.unwrap(), Some(50));

        let err = store.refer(user, other, task, bonuses).await.unwrap_err();
        assert!(matches!(err, CoreError::ReferralAlreadyUsed));
        assert_eq!(store.score(other).await.unwrap(), Some(0));
        assert_eq!(store.task(user, task).unwrap().referrer_id, Some(referrer));
    }
}
