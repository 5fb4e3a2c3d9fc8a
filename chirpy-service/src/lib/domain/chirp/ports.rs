use async_trait::async_trait;

use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::Chirp;
use crate::domain::chirp::models::ChirpId;
use crate::domain::chirp::models::CreateChirpCommand;
use crate::domain::chirp::models::ListChirpsQuery;
use crate::domain::user::models::UserId;

/// Port for chirp domain service operations.
#[async_trait]
pub trait ChirpServicePort: Send + Sync + 'static {
    /// Publish a chirp for its author.
    async fn create_chirp(&self, command: CreateChirpCommand) -> Result<Chirp, ChirpError>;

    /// List chirps, optionally for one author, ordered by creation time.
    async fn list_chirps(&self, query: ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError>;

    /// # Errors
    /// * `NotFound` - Chirp does not exist
    async fn get_chirp(&self, id: &ChirpId) -> Result<Chirp, ChirpError>;

    /// Delete a chirp on behalf of `requester`.
    ///
    /// # Errors
    /// * `NotFound` - Chirp does not exist
    /// * `NotAuthor` - `requester` did not write the chirp
    async fn delete_chirp(&self, id: &ChirpId, requester: &UserId) -> Result<(), ChirpError>;

    /// Delete every chirp. Returns how many were removed.
    async fn delete_all_chirps(&self) -> Result<u64, ChirpError>;
}

/// Persistence operations for chirps.
#[async_trait]
pub trait ChirpRepository: Send + Sync + 'static {
    async fn create(&self, chirp: Chirp) -> Result<Chirp, ChirpError>;

    async fn find_by_id(&self, id: &ChirpId) -> Result<Option<Chirp>, ChirpError>;

    async fn list(&self, query: ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError>;

    /// Delete the chirp only if `author` wrote it. Returns whether a row was removed.
    async fn delete_by_author(&self, id: &ChirpId, author: &UserId) -> Result<bool, ChirpError>;

    async fn delete_all(&self) -> Result<u64, ChirpError>;
}
