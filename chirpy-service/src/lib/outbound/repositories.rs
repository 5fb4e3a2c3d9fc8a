//! PostgreSQL adapters for the domain persistence ports.

pub mod chirp;
pub mod refresh_token;
pub mod user;

pub use chirp::PostgresChirpRepository;
pub use refresh_token::PostgresRefreshTokenStore;
pub use user::PostgresUserRepository;
