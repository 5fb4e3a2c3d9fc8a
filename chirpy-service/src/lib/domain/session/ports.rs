use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginSession;
use crate::domain::session::models::Principal;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::models::RefreshedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UserId;

/// Port for login, access token validation and refresh token lifecycle.
///
/// Every operation takes the caller's clock reading so expiry decisions are
/// made against one instant per request.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    async fn login(
        &self,
        email: EmailAddress,
        password: Password,
        now: DateTime<Utc>,
    ) -> Result<LoginSession, SessionError>;

    /// Resolve an access token to the principal it was issued for.
    ///
    /// # Errors
    /// * `AccessToken` - Signature, structure, validity window or issuer rejected
    async fn authenticate(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, SessionError>;

    /// Persist a new refresh token for `user_id` and return its value.
    ///
    /// # Errors
    /// * `Conflict` - Every generation attempt collided
    async fn issue_refresh_token(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError>;

    /// Look up the owner of a usable refresh token without changing it.
    ///
    /// # Errors
    /// * `RefreshToken(NotFound | Revoked | Expired)`
    async fn redeem(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, SessionError>;

    /// Exchange a refresh token for a new access token under the configured
    /// rotation policy.
    ///
    /// # Errors
    /// * `RefreshToken(NotFound | Revoked | Expired)`
    async fn refresh(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshedSession, SessionError>;

    /// Revoke a refresh token. Unknown and already revoked tokens succeed too.
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<(), SessionError>;

    /// Purge refresh tokens past their expiry. Returns how many were removed.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionError>;

    /// Remove every refresh token.
    async fn delete_all_sessions(&self) -> Result<u64, SessionError>;
}

/// Persistence for refresh tokens.
///
/// Every state change is a single atomic conditional write so that a revoke
/// racing a consume resolves to exactly one winner.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Insert a new record.
    ///
    /// # Errors
    /// * `Conflict` - A record with the same token value already exists
    async fn insert(&self, token: RefreshToken) -> Result<(), SessionError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, SessionError>;

    /// Revoke the token if it is neither revoked nor expired at `now`, returning
    /// its owner. `None` means the token was not usable.
    async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, SessionError>;

    /// Set `revoked_at = now` if it is unset. Returns whether this call revoked it.
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<bool, SessionError>;

    /// Delete records whose expiry lies before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionError>;

    async fn delete_all(&self) -> Result<u64, SessionError>;
}
