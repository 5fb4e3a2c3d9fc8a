use thiserror::Error;

/// Error type for access token operations.
///
/// Each validation failure is distinct so callers can log the exact reason;
/// the HTTP boundary collapses all of them into a single "unauthorized".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token was issued by {0:?}")]
    WrongIssuer(String),
}
