//! Access and refresh token issuance and validation.
//!
//! Access tokens are stateless HS256 JWTs carrying `{sub, iat, exp}`;
//! validity is purely signature + expiry. Refresh tokens are 32 bytes of
//! CSPRNG output, hex-encoded; this module never stores them — callers
//! persist [`hash_refresh_secret`] of the value and discard the rest.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Entropy of a refresh-token secret, before hex encoding.
pub const REFRESH_SECRET_BYTES: usize = 32;

/// Claim set embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id.
    pub sub: Uuid,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expiry, Unix seconds.
    pub exp: i64,
}

impl AccessClaims {
    /// Claims expiring `ttl` from now.
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and validates tokens against one signing secret.
///
/// Constructed once at startup from [`crate::config::CoreConfig`] and
/// cloned wherever needed; holds no mutable state.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
        }
    }

    /// Produces a signed access token for `user_id` with the configured
    /// lifetime.
    pub fn issue_access_token(&self, user_id: Uuid) -> CoreResult<String> {
        self.sign(&AccessClaims::new(user_id, self.access_ttl))
    }

    /// Signs an explicit claim set. Exposed so tests can mint tokens with
    /// arbitrary expiry offsets.
    pub fn sign(&self, claims: &AccessClaims) -> CoreResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| CoreError::TokenInvalid)
    }

    /// Produces a fresh refresh-token secret: 32 random bytes, hex-encoded.
    ///
    /// The service keeps nothing; the caller persists the hash.
    pub fn issue_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Verifies signature and expiry.
    ///
    /// `TokenExpired` only when the signature checked out and the token is
    /// past `exp`; every other failure is `TokenInvalid`.
    pub fn validate_access_token(&self, token: &str) -> CoreResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<AccessClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CoreError::TokenExpired,
                _ => CoreError::TokenInvalid,
            }
        })?;

        Ok(data.claims)
    }
}

/// SHA-256 hex of a refresh secret — the only form that touches storage.
pub fn hash_refresh_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
