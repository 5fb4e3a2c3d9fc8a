use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;

use crate::domain::session::errors::RefreshTokenError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Persisted refresh token record.
///
/// `revoked_at` only ever goes from `None` to `Some`.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// New active record for `user_id`, expiring `ttl` after `now`.
    pub fn issue(token: String, user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token,
            user_id,
            created_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        }
    }

    /// Check whether the token can be redeemed at `now`. Revocation is reported
    /// ahead of expiry.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<UserId, RefreshTokenError> {
        if self.revoked_at.is_some() {
            Err(RefreshTokenError::Revoked)
        } else if now > self.expires_at {
            Err(RefreshTokenError::Expired)
        } else {
            Ok(self.user_id)
        }
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshToken")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// What happens to a refresh token when it is exchanged for an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// The token stays valid until it expires or is revoked.
    Reuse,
    /// The token is revoked and a new one is returned alongside the access token.
    Rotate,
}

/// Refresh token lifetime and rotation behaviour.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub refresh_token_ttl: Duration,
    pub rotation: RotationPolicy,
}

/// The identity behind a validated access token. Lives for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
}

/// Outcome of a successful login.
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of a successful refresh.
pub struct RefreshedSession {
    pub user_id: UserId,
    pub access_token: String,
    /// Present only under `RotationPolicy::Rotate`.
    pub refresh_token: Option<String>,
}
