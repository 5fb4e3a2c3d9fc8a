use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<UserId, User>, email: &EmailAddress, except: &UserId) -> bool {
    users
        .values()
        .any(|existing| existing.id != *except && existing.email == *email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user.email, &user.id) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user.email, &user.id) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        match users.get_mut(&user.id) {
            Some(existing) => {
                existing.email = user.email.clone();
                existing.password_hash = user.password_hash.clone();
                existing.updated_at = user.updated_at;
                Ok(existing.clone())
            }
            None => Err(UserError::NotFound(user.id.to_string())),
        }
    }

    async fn set_chirpy_red(
        &self,
        id: &UserId,
        is_chirpy_red: bool,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;

        user.is_chirpy_red = is_chirpy_red;
        user.updated_at = now;

        Ok(user.clone())
    }

    async fn delete_all(&self) -> Result<u64, UserError> {
        let mut users = self.users.write().await;
        let deleted = users.len() as u64;
        users.clear();

        Ok(deleted)
    }
}
