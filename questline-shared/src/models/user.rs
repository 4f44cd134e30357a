//! User account and refresh-token records.
//!
//! ```sql
//! CREATE TABLE users (
//!     user_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Identity is immutable after registration; there is no update or delete
//! path in scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account as stored. Carries the password hash; never hand
/// this to the adapter layer directly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Opaque unique id, generated by the store.
    pub user_id: Uuid,

    /// Unique, format-validated at registration.
    pub email: String,

    /// Argon2id hash in PHC string format. Never a plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// The slice of [`User`] that is safe to return from `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
        }
    }
}

/// Stored refresh-token record. Holds only the SHA-256 hex of the secret;
/// the raw secret is returned to the client once and never persisted.
/// Multiple live records per user are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh token pair handed back from `issue_tokens`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
