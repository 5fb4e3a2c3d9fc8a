use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtError;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::RefreshTokenError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginSession;
use crate::domain::session::models::Principal;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::models::RefreshedSession;
use crate::domain::session::models::RotationPolicy;
use crate::domain::session::models::SessionSettings;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Attempts at generating a fresh refresh token before giving up on collisions.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Domain service for login, access token validation and refresh tokens.
pub struct SessionService<UR, RS>
where
    UR: UserRepository,
    RS: RefreshTokenStore,
{
    users: Arc<UR>,
    store: Arc<RS>,
    authenticator: Arc<Authenticator>,
    settings: SessionSettings,
}

impl<UR, RS> SessionService<UR, RS>
where
    UR: UserRepository,
    RS: RefreshTokenStore,
{
    pub fn new(
        users: Arc<UR>,
        store: Arc<RS>,
        authenticator: Arc<Authenticator>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            users,
            store,
            authenticator,
            settings,
        }
    }

    /// Explain why `consume` refused a token. A record that still looks usable
    /// lost a race with a concurrent consume or revoke, so it counts as revoked.
    async fn unusable_reason(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshTokenError, SessionError> {
        Ok(match self.store.find(token).await? {
            None => RefreshTokenError::NotFound,
            Some(record) => record
                .check_usable(now)
                .err()
                .unwrap_or(RefreshTokenError::Revoked),
        })
    }
}

#[async_trait]
impl<UR, RS> SessionServicePort for SessionService<UR, RS>
where
    UR: UserRepository,
    RS: RefreshTokenStore,
{
    async fn login(
        &self,
        email: EmailAddress,
        password: Password,
        now: DateTime<Utc>,
    ) -> Result<LoginSession, SessionError> {
        let user = self.users.find_by_email(&email).await?;

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let subject = user.as_ref().map(|u| u.id.to_string()).unwrap_or_default();

        // Argon2 runs on the blocking pool, including the decoy path for
        // unknown emails.
        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), stored_hash.as_deref(), &subject, now)
        })
        .await
        .map_err(|e| SessionError::Unknown(format!("Credential check task failed: {}", e)))?;

        let (user, authentication) = match (user, result) {
            (Some(user), Ok(authentication)) => (user, authentication),
            (user, Err(e)) => {
                let error = SessionError::from(e);
                if matches!(error, SessionError::InvalidCredentials) {
                    let reason = if user.is_some() {
                        "password mismatch"
                    } else {
                        "unknown email"
                    };
                    tracing::info!(reason, "Login rejected");
                }
                return Err(error);
            }
            (None, Ok(_)) => return Err(SessionError::InvalidCredentials),
        };

        let refresh_token = self.issue_refresh_token(&user.id, now).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            user,
            access_token: authentication.access_token,
            refresh_token,
        })
    }

    async fn authenticate(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, SessionError> {
        let subject = self.authenticator.validate_token(access_token, now)?;

        let user_id = UserId::from_string(&subject)
            .map_err(|e| JwtError::Malformed(format!("Subject is not a user ID: {}", e)))?;

        Ok(Principal { user_id })
    }

    async fn issue_refresh_token(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let record = RefreshToken::issue(
                auth::generate_refresh_token(),
                *user_id,
                now,
                self.settings.refresh_token_ttl,
            );
            let token = record.token.clone();

            match self.store.insert(record).await {
                Ok(()) => return Ok(token),
                Err(SessionError::Conflict) => {
                    tracing::warn!(attempt, user_id = %user_id, "Refresh token collision");
                }
                Err(e) => return Err(e),
            }
        }

        Err(SessionError::Conflict)
    }

    async fn redeem(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, SessionError> {
        let record = self
            .store
            .find(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        Ok(record.check_usable(now)?)
    }

    async fn refresh(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshedSession, SessionError> {
        let user_id = match self.settings.rotation {
            RotationPolicy::Reuse => self.redeem(token, now).await?,
            RotationPolicy::Rotate => match self.store.consume(token, now).await? {
                Some(user_id) => user_id,
                None => return Err(self.unusable_reason(token, now).await?.into()),
            },
        };

        let access_token = self
            .authenticator
            .generate_token(&user_id.to_string(), now)?;

        // The presented token is already consumed here. A failed insert leaves
        // the caller without a refresh token and it must log in again.
        let refresh_token = match self.settings.rotation {
            RotationPolicy::Reuse => None,
            RotationPolicy::Rotate => Some(self.issue_refresh_token(&user_id, now).await?),
        };

        Ok(RefreshedSession {
            user_id,
            access_token,
            refresh_token,
        })
    }

    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.store.revoke(token, now).await? {
            tracing::info!("Refresh token revoked");
        } else {
            tracing::debug!("Revoke requested for an unknown or already revoked refresh token");
        }

        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let purged = self.store.delete_expired(now).await?;
        tracing::info!(purged, "Expired refresh tokens swept");

        Ok(purged)
    }

    async fn delete_all_sessions(&self) -> Result<u64, SessionError> {
        self.store.delete_all().await
    }
}
