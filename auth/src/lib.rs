//! Authentication utilities library
//!
//! Provides the credential and token primitives the service builds on:
//! - Password hashing (Argon2id) with a decoy path for unknown accounts
//! - HS256 access token issuance and validation against a caller-supplied clock
//! - Opaque refresh token generation
//! - Constant-time API key comparison
//!
//! Persistence of refresh tokens is left to the service, which owns the storage.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenSigner;
//! use chrono::{Duration, Utc};
//!
//! let signer = TokenSigner::new(b"secret_key_at_least_32_bytes_long!", "chirpy-access", Duration::hours(1));
//! let now = Utc::now();
//! let token = signer.issue("user123", now).unwrap();
//! assert_eq!(signer.validate(&token, now).unwrap(), "user123");
//! ```

pub mod api_key;
pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod refresh;

// Re-export commonly used items
pub use api_key::api_keys_match;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenSigner;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use refresh::generate_refresh_token;
