//! Auth engine: registration, login, token issuance.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::auth::password;
use crate::auth::token::{self, TokenService};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::models::task::TaskSeed;
use crate::models::user::{AuthenticatedUser, TokenPair};
use crate::service::with_timeout;
use crate::store::CredentialStore;

/// Accepted password length range, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 100;

/// Orchestrates the credential store and token service.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    refresh_ttl: Duration,
    default_tasks: Arc<Vec<TaskSeed>>,
    op_timeout: StdDuration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService, config: &CoreConfig) -> Self {
        Self {
            store,
            tokens,
            refresh_ttl: config.refresh_token_ttl,
            default_tasks: Arc::new(config.default_tasks.clone()),
            op_timeout: config.op_timeout,
        }
    }

    /// Registers a new account: validates input, hashes the password, and
    /// delegates to the store to create the user row, the three seeded
    /// tasks, and the zero-score scoreboard row in one atomic unit.
    ///
    /// Any failure past validation surfaces as `RegistrationFailed` (the
    /// whole unit rolled back), except timeouts, which stay distinct.
    pub async fn register(&self, email: &str, password: &str) -> CoreResult<()> {
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = password::hash_password(password)
            .map_err(|e| CoreError::RegistrationFailed {
                source: Box::new(CoreError::storage("hash_password", e)),
            })?;

        let created = with_timeout(
            self.op_timeout,
            "register",
            self.store.create_user(email, &password_hash, &self.default_tasks),
        )
        .await;

        match created {
            Ok(user_id) => {
                tracing::info!(%user_id, "user registered");
                Ok(())
            }
            Err(timeout @ CoreError::Timeout { .. }) => Err(timeout),
            Err(e) => Err(CoreError::RegistrationFailed { source: Box::new(e) }),
        }
    }

    /// Authenticates by email and password.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller; the difference exists only in the debug log.
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthenticatedUser> {
        let user = with_timeout(
            self.op_timeout,
            "login",
            self.store.find_user_by_email(email),
        )
        .await?;

        let Some(user) = user else {
            tracing::debug!("login attempt for unknown email");
            return Err(CoreError::InvalidCredentials);
        };

        let verified = password::verify_password(password, &user.password_hash)
            .map_err(|e| CoreError::storage("login", e))?;
        if !verified {
            return Err(CoreError::InvalidCredentials);
        }

        Ok(AuthenticatedUser::from(&user))
    }

    /// Issues an access/refresh token pair and durably records the hashed
    /// refresh secret. If the record cannot be persisted, no tokens are
    /// returned.
    pub async fn issue_tokens(&self, user_id: Uuid) -> CoreResult<TokenPair> {
        let access_token = self.tokens.issue_access_token(user_id)?;
        let refresh_token = self.tokens.issue_refresh_token();

        let token_hash = token::hash_refresh_secret(&refresh_token);
        let expires_at = Utc::now() + self.refresh_ttl;

        let saved = with_timeout(
            self.op_timeout,
            "issue_tokens",
            self.store.save_refresh_token(user_id, &token_hash, expires_at),
        )
        .await;

        match saved {
            Ok(()) => Ok(TokenPair {
                access_token,
                refresh_token,
            }),
            Err(timeout @ CoreError::Timeout { .. }) => Err(timeout),
            Err(e) => Err(CoreError::TokenPersistence { source: Box::new(e) }),
        }
    }
}

fn validate_email(email: &str) -> CoreResult<()> {
    if !email.validate_email() {
        return Err(CoreError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> CoreResult<()> {
    let chars = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&chars) {
        return Err(CoreError::Validation(format!(
            "password must be between {} and {} characters",
            PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, AuthService) {
        let config = CoreConfig::new("test-secret-key-at-least-32-bytes");
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.access_token_ttl);
        let auth = AuthService::new(store.clone(), tokens, &config);
        (store, auth)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (_, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();

        let first = auth.login("a@x.com", "password1").await.unwrap();
        let second = auth.login("a@x.com", "password1").await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let (_, auth) = setup();

        let err = auth.register("not-an-email", "password1").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = auth.register("a@x.com", "short").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = auth.register("a@x.com", &"x".repeat(101)).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (_, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();
        let err = auth.register("a@x.com", "password2").await.unwrap_err();
        assert!(matches!(err, CoreError::RegistrationFailed { .. }));
    }

    #[tokio::test]
    async fn test_register_seeds_tasks_and_zero_score() {
        let (store, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();
        let user = auth.login("a@x.com", "password1").await.unwrap();

        let tasks = store.tasks_for(user.user_id);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| !t.complete && t.reward == 150));

        use crate::store::ScoringStore;
        assert_eq!(store.score(user.user_id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_login_never_reveals_unknown_email() {
        let (_, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();

        let wrong_password = auth.login("a@x.com", "password2").await.unwrap_err();
        assert!(matches!(wrong_password, CoreError::InvalidCredentials));

        let unknown_email = auth.login("b@x.com", "password1").await.unwrap_err();
        assert!(matches!(unknown_email, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_issue_tokens_persists_hash_not_secret() {
        let (store, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();
        let user = auth.login("a@x.com", "password1").await.unwrap();

        let pair = auth.issue_tokens(user.user_id).await.unwrap();

        let records = store.refresh_tokens_for(user.user_id);
        assert_eq!(records.len(), 1);
        assert_ne!(records[0].refresh_token_hash, pair.refresh_token);
        assert_eq!(
            records[0].refresh_token_hash,
            token::hash_refresh_secret(&pair.refresh_token)
        );
        assert!(records[0].expires_at > Utc::now() + Duration::days(29));
    }

    #[tokio::test]
    async fn test_multiple_refresh_records_coexist() {
        let (store, auth) = setup();

        auth.register("a@x.com", "password1").await.unwrap();
        let user = auth.login("a@x.com", "password1").await.unwrap();

        auth.issue_tokens(user.user_id).await.unwrap();
        auth.issue_tokens(user.user_id).await.unwrap();

        assert_eq!(store.refresh_tokens_for(user.user_id).len(), 2);
    }
}
