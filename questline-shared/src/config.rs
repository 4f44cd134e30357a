//! Core configuration.
//!
//! One immutable value constructed at startup and passed explicitly into
//! the token service and both engines. The core never reads ambient state;
//! the API crate is responsible for sourcing these values from the
//! environment.

use chrono::Duration;
use std::time::Duration as StdDuration;

use crate::models::task::TaskSeed;

/// Reward attached to each of the default tasks seeded at registration.
pub const DEFAULT_TASK_REWARD: i64 = 150;

/// Score credited to the referring user.
pub const REFERRER_BONUS: i64 = 100;

/// Score credited to the referred user's own scoreboard.
pub const REFEREE_BONUS: i64 = 50;

/// Referral bonus pair, threaded into the scoring engine.
#[derive(Debug, Clone, Copy)]
pub struct ReferralBonuses {
    /// Credited to the referrer's scoreboard.
    pub referrer: i64,

    /// Credited to the referee's scoreboard.
    pub referee: i64,
}

impl Default for ReferralBonuses {
    fn default() -> Self {
        Self {
            referrer: REFERRER_BONUS,
            referee: REFEREE_BONUS,
        }
    }
}

/// Process-wide core configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Symmetric signing secret for access tokens.
    pub jwt_secret: String,

    /// Access-token lifetime. 15 minutes in production.
    pub access_token_ttl: Duration,

    /// Refresh-token lifetime. 30 days in production.
    pub refresh_token_ttl: Duration,

    /// Tasks seeded for every new user, exactly as stored.
    pub default_tasks: Vec<TaskSeed>,

    /// Referral crediting amounts.
    pub referral: ReferralBonuses,

    /// Budget for a single engine operation against the store. On expiry
    /// the in-flight transaction is dropped and rolled back.
    pub op_timeout: StdDuration,
}

impl CoreConfig {
    /// Builds a configuration with production defaults around the given
    /// signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(30),
            default_tasks: default_task_catalog(),
            referral: ReferralBonuses::default(),
            op_timeout: StdDuration::from_secs(5),
        }
    }
}

/// The fixed catalog of tasks every account starts with.
pub fn default_task_catalog() -> Vec<TaskSeed> {
    [
        "subscribe to 'telegram' channel/group",
        "subscribe to 'instagram' account",
        "subscribe to 'vkontakte' group",
    ]
    .into_iter()
    .map(|name| TaskSeed {
        name: name.to_string(),
        reward: DEFAULT_TASK_REWARD,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = default_task_catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|t| t.reward == 150));
        assert!(catalog
            .iter()
            .any(|t| t.name == "subscribe to 'telegram' channel/group"));
    }

    #[test]
    fn test_production_defaults() {
        let cfg = CoreConfig::new("secret");
        assert_eq!(cfg.access_token_ttl, Duration::minutes(15));
        assert_eq!(cfg.refresh_token_ttl, Duration::days(30));
        assert_eq!(cfg.referral.referrer, 100);
        assert_eq!(cfg.referral.referee, 50);
    }
}
