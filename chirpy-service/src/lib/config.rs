use std::env;

use auth::PasswordError;
use auth::PasswordHasher;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::session::models::RotationPolicy;

/// Shortest HMAC secret accepted for signing access tokens.
const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    pub polka: PolkaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub filepath_root: String,
    pub platform: Platform,
}

/// Deployment platform. Destructive admin endpoints only exist on `dev`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Prod,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string; in-memory storage is used when absent.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub refresh_token_ttl_days: i64,
    pub rotation: RotationPolicy,
    pub sweep_interval_secs: u64,
}

/// Argon2id cost overrides. Unset fields fall back to the Argon2 defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PasswordConfig {
    pub memory_kib: Option<u32>,
    pub iterations: Option<u32>,
    pub parallelism: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolkaConfig {
    pub api_key: String,
}

impl JwtConfig {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl_secs)
    }
}

impl SessionConfig {
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_ttl_days)
    }
}

impl PasswordConfig {
    /// Build the password hasher these settings describe.
    pub fn hasher(&self) -> Result<PasswordHasher, PasswordError> {
        match (self.memory_kib, self.iterations, self.parallelism) {
            (None, None, None) => Ok(PasswordHasher::new()),
            (memory_kib, iterations, parallelism) => PasswordHasher::with_cost(
                memory_kib.unwrap_or(argon2_defaults::M_COST),
                iterations.unwrap_or(argon2_defaults::T_COST),
                parallelism.unwrap_or(argon2_defaults::P_COST),
            ),
        }
    }
}

mod argon2_defaults {
    pub const M_COST: u32 = 19 * 1024;
    pub const T_COST: u32 = 2;
    pub const P_COST: u32 = 1;
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080)?
            .set_default("server.filepath_root", ".")?
            .set_default("server.platform", "prod")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.issuer", "chirpy-access")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("session.refresh_token_ttl_days", 60)?
            .set_default("session.rotation", "reuse")?
            .set_default("session.sweep_interval_secs", 3600)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }

        if self.jwt.access_token_ttl_secs <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_ttl_secs must be positive".to_string(),
            ));
        }

        if self.session.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "session.refresh_token_ttl_days must be positive".to_string(),
            ));
        }

        if self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "session.sweep_interval_secs must be positive".to_string(),
            ));
        }

        if self.polka.api_key.is_empty() {
            return Err(ConfigError::Message("polka.api_key must be set".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                http_port: 8080,
                filepath_root: ".".to_string(),
                platform: Platform::Dev,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
                issuer: "chirpy-access".to_string(),
                access_token_ttl_secs: 3600,
            },
            session: SessionConfig {
                refresh_token_ttl_days: 60,
                rotation: RotationPolicy::Reuse,
                sweep_interval_secs: 3600,
            },
            password: PasswordConfig::default(),
            polka: PolkaConfig {
                api_key: "f271c81ff7084ee5b99a5091b42d486e".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = config();
        config.jwt.secret = "too-short".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let mut config = config();
        config.polka.api_key = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ttls() {
        let config = config();

        assert_eq!(config.jwt.access_token_ttl(), chrono::Duration::hours(1));
        assert_eq!(
            config.session.refresh_token_ttl(),
            chrono::Duration::days(60)
        );
    }

    #[test]
    fn test_password_hasher_overrides() {
        let password = PasswordConfig {
            memory_kib: Some(1024),
            iterations: Some(1),
            parallelism: None,
        };
        let hasher = password.hasher().expect("valid parameters");
        let hash = hasher.hash("secret").unwrap();

        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    fn platform_in(files: &[&str]) -> Platform {
        let builder = files.iter().fold(ConfigBuilder::builder(), |builder, name| {
            let path = format!("{}/config/{}", env!("CARGO_MANIFEST_DIR"), name);
            builder.add_source(File::with_name(&path))
        });

        builder
            .build()
            .unwrap()
            .get::<Platform>("server.platform")
            .unwrap()
    }

    #[test]
    fn test_shipped_defaults_disable_reset() {
        assert_eq!(platform_in(&["default"]), Platform::Prod);
        assert_eq!(platform_in(&["default", "development"]), Platform::Dev);
    }
}
