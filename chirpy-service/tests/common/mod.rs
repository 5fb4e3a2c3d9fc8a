#![allow(dead_code)]

use std::sync::Arc;

use chirpy_service::config::Config;
use chirpy_service::config::DatabaseConfig;
use chirpy_service::config::JwtConfig;
use chirpy_service::config::PasswordConfig;
use chirpy_service::config::Platform;
use chirpy_service::config::PolkaConfig;
use chirpy_service::config::ServerConfig;
use chirpy_service::config::SessionConfig;
use chirpy_service::inbound::http::router::create_router;
use chirpy_service::inbound::http::router::AppState;
use chirpy_service::outbound::in_memory::InMemoryChirpRepository;
use chirpy_service::outbound::in_memory::InMemoryRefreshTokenStore;
use chirpy_service::outbound::in_memory::InMemoryUserRepository;
use chirpy_service::session::models::RotationPolicy;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const POLKA_API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234";

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub config: Config,
}

/// A registered and logged-in account
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_config(platform: Platform, rotation: RotationPolicy) -> Config {
    Config {
        server: ServerConfig {
            http_port: 0,
            filepath_root: env!("CARGO_MANIFEST_DIR").to_string(),
            platform,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            issuer: "chirpy-access".to_string(),
            access_token_ttl_secs: 3600,
        },
        session: SessionConfig {
            refresh_token_ttl_days: 60,
            rotation,
            sweep_interval_secs: 3600,
        },
        password: PasswordConfig {
            memory_kib: Some(1024),
            iterations: Some(1),
            parallelism: Some(1),
        },
        polka: PolkaConfig {
            api_key: POLKA_API_KEY.to_string(),
        },
    }
}

impl TestApp {
    /// Spawn the application on the dev platform with the default rotation policy
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(Platform::Dev, RotationPolicy::Reuse)).await
    }

    /// Spawn the application in a background task with the given configuration
    pub async fn spawn_with(config: Config) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state = AppState::assemble(
            &config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryChirpRepository::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
        )
        .expect("Failed to assemble application state");

        let router = create_router(state, &config.server.filepath_root);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path))
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/users")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register `email` and log in, returning both tokens
    pub async fn register_and_login(&self, email: &str) -> TestUser {
        let created = self.create_user(email, PASSWORD).await;
        assert_eq!(created.status(), reqwest::StatusCode::CREATED);

        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        TestUser {
            id: body["data"]["id"].as_str().unwrap().to_string(),
            email: body["data"]["email"].as_str().unwrap().to_string(),
            token: body["data"]["token"].as_str().unwrap().to_string(),
            refresh_token: body["data"]["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.post("/api/chirps")
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
