use thiserror::Error;

use crate::domain::chirp::models::ChirpId;
use crate::domain::user::errors::UserIdError;

/// Error type for ChirpId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChirpIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error type for ChirpBody validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChirpBodyError {
    #[error("Chirp is empty")]
    Empty,

    #[error("Chirp is too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error type for listing parameters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortOrderError {
    #[error("Invalid sort order {0:?}: expected \"asc\" or \"desc\"")]
    Invalid(String),
}

/// Top-level error type for all chirp-related operations
#[derive(Debug, Clone, Error)]
pub enum ChirpError {
    #[error("Invalid chirp ID: {0}")]
    InvalidChirpId(#[from] ChirpIdError),

    #[error("Invalid chirp: {0}")]
    InvalidBody(#[from] ChirpBodyError),

    #[error("Invalid author ID: {0}")]
    InvalidAuthorId(#[from] UserIdError),

    #[error("{0}")]
    InvalidSortOrder(#[from] SortOrderError),

    // Domain-level errors
    #[error("Chirp not found: {0}")]
    NotFound(ChirpId),

    #[error("Chirp {0} belongs to another user")]
    NotAuthor(ChirpId),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
