//! Database models and data structures.
//!
//! - `user`: account identity and refresh-token records
//! - `task`: per-user rewarded tasks and the seed catalog
//! - `scoreboard`: cumulative scores and leaderboard rows

pub mod scoreboard;
pub mod task;
pub mod user;
