use chrono::DateTime;
use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::TokenSigner;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and access tokens.
///
/// Services hold one instance for the life of the process; it is immutable and
/// safe to share across request tasks.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_signer: TokenSigner,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    pub fn new(password_hasher: PasswordHasher, token_signer: TokenSigner) -> Self {
        Self {
            password_hasher,
            token_signer,
        }
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    pub fn token_signer(&self) -> &TokenSigner {
        &self.token_signer
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token for `subject`.
    ///
    /// `stored_hash` is `None` when no account matched the login identifier; the
    /// password is then checked against a decoy digest so both failure paths cost
    /// the same and return the same error.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or password does not match
    /// * `PasswordError` - Stored hash is unreadable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash)?,
            None => self.password_hasher.verify_decoy(password),
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.token_signer.issue(subject, now)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue an access token without password verification.
    ///
    /// Used by the refresh flow, where the caller already proved possession of a
    /// valid refresh token.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(&self, subject: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.token_signer.issue(subject, now)
    }

    /// Validate an access token and return its subject.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.token_signer.validate(token, now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(
            PasswordHasher::with_cost(1024, 1, 1).unwrap(),
            TokenSigner::new(
                b"test_secret_key_at_least_32_bytes!",
                "chirpy-access",
                Duration::hours(1),
            ),
        )
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();
        let now = Utc::now();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, Some(hash.as_str()), "user123", now)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let subject = authenticator
            .validate_token(&result.access_token, now)
            .expect("Token validation failed");
        assert_eq!(subject, "user123");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator.hash_password("my_password").unwrap();

        let result =
            authenticator.authenticate("wrong_password", Some(hash.as_str()), "user123", Utc::now());
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_unknown_account() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", None, "user123", Utc::now());
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_hash() {
        let authenticator = authenticator();

        let result =
            authenticator.authenticate("my_password", Some("not-a-phc-string"), "u", Utc::now());
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(PasswordError::MalformedHash(_)))
        ));
    }

    #[test]
    fn test_generate_and_validate_token() {
        let authenticator = authenticator();
        let now = Utc::now();

        let token = authenticator
            .generate_token("user123", now)
            .expect("Failed to generate token");

        assert_eq!(authenticator.validate_token(&token, now).unwrap(), "user123");
        assert_eq!(
            authenticator.validate_token(&token, now + Duration::hours(1)),
            Err(JwtError::Expired)
        );
    }
}
