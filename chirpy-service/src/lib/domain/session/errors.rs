use auth::JwtError;
use thiserror::Error;

use crate::user::errors::UserError;

/// Why a refresh token could not be redeemed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RefreshTokenError {
    #[error("Refresh token not found")]
    NotFound,

    #[error("Refresh token has been revoked")]
    Revoked,

    #[error("Refresh token is expired")]
    Expired,
}

/// Top-level error for login, token validation and refresh token lifecycle.
///
/// Variants keep the precise reason for logs; the HTTP layer collapses every
/// credential failure into the same 401.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access token rejected: {0}")]
    AccessToken(#[from] JwtError),

    #[error("Refresh token rejected: {0}")]
    RefreshToken(#[from] RefreshTokenError),

    #[error("Refresh token collided with an existing one")]
    Conflict,

    #[error("Stored password hash is unusable: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("User lookup failed: {0}")]
    User(#[from] UserError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SessionError {
    /// True when the failure is the caller's credential, as opposed to an
    /// infrastructure fault.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidCredentials
                | SessionError::AccessToken(_)
                | SessionError::RefreshToken(_)
        )
    }
}

impl From<auth::AuthenticationError> for SessionError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => SessionError::InvalidCredentials,
            auth::AuthenticationError::PasswordError(e) => SessionError::Password(e),
            auth::AuthenticationError::JwtError(e) => SessionError::AccessToken(e),
        }
    }
}
