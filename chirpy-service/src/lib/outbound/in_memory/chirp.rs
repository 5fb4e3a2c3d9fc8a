use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::Chirp;
use crate::domain::chirp::models::ChirpId;
use crate::domain::chirp::models::ListChirpsQuery;
use crate::domain::chirp::models::SortOrder;
use crate::domain::chirp::ports::ChirpRepository;
use crate::domain::user::models::UserId;

/// Chirps kept in insertion order, which breaks ties between equal timestamps.
#[derive(Default)]
pub struct InMemoryChirpRepository {
    chirps: RwLock<Vec<Chirp>>,
}

impl InMemoryChirpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChirpRepository for InMemoryChirpRepository {
    async fn create(&self, chirp: Chirp) -> Result<Chirp, ChirpError> {
        self.chirps.write().await.push(chirp.clone());
        Ok(chirp)
    }

    async fn find_by_id(&self, id: &ChirpId) -> Result<Option<Chirp>, ChirpError> {
        Ok(self
            .chirps
            .read()
            .await
            .iter()
            .find(|chirp| chirp.id == *id)
            .cloned())
    }

    async fn list(&self, query: ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .read()
            .await
            .iter()
            .filter(|chirp| query.author.map_or(true, |author| chirp.user_id == author))
            .cloned()
            .collect();

        chirps.sort_by_key(|chirp| chirp.created_at);
        if query.sort == SortOrder::Descending {
            chirps.reverse();
        }

        Ok(chirps)
    }

    async fn delete_by_author(&self, id: &ChirpId, author: &UserId) -> Result<bool, ChirpError> {
        let mut chirps = self.chirps.write().await;
        let before = chirps.len();
        chirps.retain(|chirp| !(chirp.id == *id && chirp.user_id == *author));

        Ok(chirps.len() < before)
    }

    async fn delete_all(&self) -> Result<u64, ChirpError> {
        let mut chirps = self.chirps.write().await;
        let deleted = chirps.len() as u64;
        chirps.clear();

        Ok(deleted)
    }
}
