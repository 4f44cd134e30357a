//! Core error taxonomy.
//!
//! Every engine operation surfaces one of these kinds and nothing else.
//! Store-level failures are wrapped with the name of the operation that was
//! running when they occurred; the wrapped source stays available for logs
//! but is never exposed to API clients.

use std::error::Error as StdError;

/// Result alias used throughout the core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Unified error type for the auth and scoring engines.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed input: email format, password length, empty task name,
    /// nil user id.
    #[error("{0}")]
    Validation(String),

    /// Login mismatch. Deliberately covers unknown email as well, so the
    /// boundary cannot be used for account enumeration.
    #[error("wrong email or password")]
    InvalidCredentials,

    /// No scoreboard row exists for the requested user.
    #[error("user not found")]
    UserNotFound,

    /// No matching task row. Covers both "no such task" and "already
    /// completed"; the store cannot tell them apart and callers depend on
    /// the coarse signal.
    #[error("task not found")]
    TaskNotFound,

    /// A user tried to refer themselves.
    #[error("referrer_id cannot be the same as user_id")]
    SelfReferral,

    /// The task already carries a referrer.
    #[error("referral already used for this task")]
    ReferralAlreadyUsed,

    /// Signature checked out but the token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Any other token verification failure: bad signature, malformed
    /// payload, wrong algorithm.
    #[error("invalid token")]
    TokenInvalid,

    /// The registration unit (user + seeded tasks + scoreboard row) did not
    /// commit. Nothing was created.
    #[error("registration failed")]
    RegistrationFailed {
        #[source]
        source: Box<CoreError>,
    },

    /// The refresh-token record could not be persisted; no tokens were
    /// handed out.
    #[error("failed to persist refresh token")]
    TokenPersistence {
        #[source]
        source: Box<CoreError>,
    },

    /// Opaque storage failure. Callers only learn which operation failed.
    #[error("storage failure during {operation}")]
    Storage {
        operation: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The operation exceeded its budget. Any in-flight transaction was
    /// rolled back; no partial state remains.
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
}

impl CoreError {
    /// Wraps an arbitrary storage-layer failure with its operation name.
    pub fn storage(
        operation: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        CoreError::Storage {
            operation,
            source: source.into(),
        }
    }

    /// True for the kinds a caller could have prevented (as opposed to
    /// infrastructure faults).
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            CoreError::Storage { .. }
                | CoreError::Timeout { .. }
                | CoreError::TokenPersistence { .. }
        )
    }
}
