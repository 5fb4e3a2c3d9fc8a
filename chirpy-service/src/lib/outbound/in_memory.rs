//! Process-local adapters for the persistence ports.
//!
//! Used when no database URL is configured, and by the integration tests.
//! Every operation holds one lock for its whole read-modify-write, which gives
//! the same atomicity as the conditional statements in the Postgres adapters.

pub mod chirp;
pub mod refresh_token;
pub mod user;

pub use chirp::InMemoryChirpRepository;
pub use refresh_token::InMemoryRefreshTokenStore;
pub use user::InMemoryUserRepository;
