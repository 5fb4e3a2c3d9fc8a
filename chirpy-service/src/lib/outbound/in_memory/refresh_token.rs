use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::user::models::UserId;

/// Refresh tokens keyed by their value.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, token: RefreshToken) -> Result<(), SessionError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token) {
            return Err(SessionError::Conflict);
        }

        tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, SessionError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, SessionError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token) {
            Some(record) if record.check_usable(now).is_ok() => {
                record.revoked_at = Some(now);
                Ok(Some(record.user_id))
            }
            _ => Ok(None),
        }
    }

    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<bool, SessionError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| record.expires_at >= now);

        Ok((before - tokens.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64, SessionError> {
        let mut tokens = self.tokens.write().await;
        let deleted = tokens.len() as u64;
        tokens.clear();

        Ok(deleted)
    }
}
