use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::chirp::errors::ChirpBodyError;
use crate::domain::chirp::errors::ChirpIdError;
use crate::domain::chirp::errors::SortOrderError;
use crate::domain::user::models::UserId;

/// Chirp aggregate root entity.
#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: ChirpId,
    pub body: ChirpBody,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chirp unique identifier value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChirpId(pub Uuid);

impl ChirpId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a chirp ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ChirpIdError> {
        Uuid::parse_str(s)
            .map(ChirpId)
            .map_err(|e| ChirpIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ChirpId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChirpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chirp body value object.
///
/// Non-empty, at most 140 characters, with profane words masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChirpBody(String);

impl ChirpBody {
    const MAX_LENGTH: usize = 140;
    const PROFANE_WORDS: [&'static str; 3] = ["kerfuffle", "sharbert", "fornax"];
    const MASK: &'static str = "****";

    /// Validate and clean a raw chirp body.
    ///
    /// Length is counted in characters before cleaning. Profane words are
    /// matched case-insensitively against whole space-separated words, so
    /// `Sharbert!` is left alone.
    ///
    /// # Errors
    /// * `Empty` - Body is empty
    /// * `TooLong` - Body exceeds 140 characters
    pub fn new(body: String) -> Result<Self, ChirpBodyError> {
        let length = body.chars().count();
        if length == 0 {
            Err(ChirpBodyError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(ChirpBodyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(Self::clean(&body)))
        }
    }

    /// Rebuild a body that was validated before it was stored.
    pub(crate) fn from_stored(body: String) -> Self {
        Self(body)
    }

    fn clean(body: &str) -> String {
        body.split(' ')
            .map(|word| {
                let lowered = word.to_lowercase();
                if Self::PROFANE_WORDS.contains(&lowered.as_str()) {
                    Self::MASK
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordering of a chirp listing by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = SortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            other => Err(SortOrderError::Invalid(other.to_string())),
        }
    }
}

/// Command to create a chirp on behalf of an authenticated author.
#[derive(Debug)]
pub struct CreateChirpCommand {
    pub author: UserId,
    pub body: ChirpBody,
}

/// Listing filter and order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListChirpsQuery {
    pub author: Option<UserId>,
    pub sort: SortOrder,
}
