use thiserror::Error;

/// Error type for password operations.
///
/// A password that simply does not match is not an error; `verify` returns `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is unreadable: {0}")]
    MalformedHash(String),

    #[error("Invalid Argon2 cost parameters: {0}")]
    InvalidParameters(String),
}
