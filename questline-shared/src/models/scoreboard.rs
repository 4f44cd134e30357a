//! Scoreboard rows and leaderboard entries.
//!
//! ```sql
//! CREATE TABLE users_scoreboard (
//!     user_id UUID PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
//!     score BIGINT NOT NULL DEFAULT 0
//! );
//! ```
//!
//! Score is cumulative and never debited in scope, so it is monotonically
//! non-decreasing for the lifetime of the account.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scoreboard row, created with score 0 at registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreboardEntry {
    pub user_id: Uuid,
    pub score: i64,
}

/// A ranked leaderboard row. Rank is 1-based, assigned by the engine in
/// score-descending order; ties fall in whatever stable order the store
/// returned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub score: i64,
}

/// Response of `get_status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserStatus {
    pub user_id: Uuid,
    pub score: i64,
}
