//! Per-user rewarded tasks.
//!
//! ```sql
//! CREATE TABLE users_tasks (
//!     user_id UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
//!     task VARCHAR(255) NOT NULL,
//!     reward BIGINT NOT NULL,
//!     complete BOOLEAN NOT NULL DEFAULT FALSE,
//!     referrer_id UUID,
//!     PRIMARY KEY (user_id, task)
//! );
//! ```
//!
//! A task has two independent once-only transitions: `complete` flips
//! false → true at most once (crediting the reward exactly once), and
//! `referrer_id` goes from NULL to a value at most once. Completion and
//! referral may happen in either order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One task row, identified by `(user_id, task)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserTask {
    pub user_id: Uuid,

    /// Task name, unique per user.
    pub task: String,

    /// Score credited when the task completes.
    pub reward: i64,

    pub complete: bool,

    /// Set once by a successful referral, never overwritten.
    pub referrer_id: Option<Uuid>,
}

/// Catalog entry used to seed tasks at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSeed {
    pub name: String,
    pub reward: i64,
}
