use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordError;
use auth::TokenSigner;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::admin;
use super::handlers::create_chirp::create_chirp;
use super::handlers::create_user::create_user;
use super::handlers::delete_chirp::delete_chirp;
use super::handlers::get_chirp::get_chirp;
use super::handlers::health::health;
use super::handlers::list_chirps::list_chirps;
use super::handlers::login::login;
use super::handlers::polka_webhook::polka_webhook;
use super::handlers::refresh::refresh;
use super::handlers::revoke::revoke;
use super::handlers::update_user::update_user;
use super::middleware::count_file_server_hit;
use super::middleware::require_principal;
use crate::config::Config;
use crate::config::Platform;
use crate::domain::chirp::ports::ChirpRepository;
use crate::domain::chirp::ports::ChirpServicePort;
use crate::domain::chirp::service::ChirpService;
use crate::domain::session::models::SessionSettings;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::service::SessionService;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;
use crate::domain::user::service::UserService;

/// Request counters shared by every handler.
#[derive(Debug, Default)]
pub struct ApiMetrics {
    pub file_server_hits: AtomicU64,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub chirp_service: Arc<dyn ChirpServicePort>,
    pub session_service: Arc<dyn SessionServicePort>,
    pub metrics: Arc<ApiMetrics>,
    pub platform: Platform,
    pub polka_api_key: Arc<str>,
}

impl AppState {
    /// Wire the domain services over the given storage adapters.
    ///
    /// # Errors
    /// * `InvalidParameters` - Configured Argon2 cost is out of range
    pub fn assemble<UR, CR, RS>(
        config: &Config,
        users: Arc<UR>,
        chirps: Arc<CR>,
        refresh_tokens: Arc<RS>,
    ) -> Result<Self, PasswordError>
    where
        UR: UserRepository,
        CR: ChirpRepository,
        RS: RefreshTokenStore,
    {
        let password_hasher = config.password.hasher()?;
        let authenticator = Arc::new(Authenticator::new(
            password_hasher.clone(),
            TokenSigner::new(
                config.jwt.secret.as_bytes(),
                config.jwt.issuer.clone(),
                config.jwt.access_token_ttl(),
            ),
        ));

        let settings = SessionSettings {
            refresh_token_ttl: config.session.refresh_token_ttl(),
            rotation: config.session.rotation,
        };

        Ok(Self {
            user_service: Arc::new(UserService::new(Arc::clone(&users), password_hasher)),
            chirp_service: Arc::new(ChirpService::new(chirps)),
            session_service: Arc::new(SessionService::new(
                users,
                refresh_tokens,
                authenticator,
                settings,
            )),
            metrics: Arc::new(ApiMetrics::default()),
            platform: config.server.platform,
            polka_api_key: Arc::from(config.polka.api_key.as_str()),
        })
    }
}

pub fn create_router(state: AppState, filepath_root: impl AsRef<Path>) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(health))
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
        .route("/api/chirps", get(list_chirps))
        .route("/api/chirps/:chirp_id", get(get_chirp))
        .route("/api/polka/webhooks", post(polka_webhook))
        .route("/admin/metrics", get(admin::metrics))
        .route("/admin/reset", post(admin::reset));

    let protected_routes = Router::new()
        .route("/api/users", put(update_user))
        .route("/api/chirps", post(create_chirp))
        .route("/api/chirps/:chirp_id", delete(delete_chirp))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal,
        ));

    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(filepath_root.as_ref()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            count_file_server_hit,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(file_server)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use axum::http::Method;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::config::DatabaseConfig;
    use crate::config::JwtConfig;
    use crate::config::PasswordConfig;
    use crate::config::PolkaConfig;
    use crate::config::ServerConfig;
    use crate::config::SessionConfig;
    use crate::domain::session::models::RotationPolicy;
    use crate::outbound::in_memory::InMemoryChirpRepository;
    use crate::outbound::in_memory::InMemoryRefreshTokenStore;
    use crate::outbound::in_memory::InMemoryUserRepository;

    fn router() -> Router {
        let config = Config {
            server: ServerConfig {
                http_port: 0,
                filepath_root: ".".to_string(),
                platform: Platform::Prod,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
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
            password: PasswordConfig {
                memory_kib: Some(1024),
                iterations: Some(1),
                parallelism: Some(1),
            },
            polka: PolkaConfig {
                api_key: "polka-key".to_string(),
            },
        };

        let state = AppState::assemble(
            &config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryChirpRepository::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
        )
        .unwrap();

        create_router(state, ".")
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(request(Method::GET, "/api/healthz", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_guard_covers_only_protected_methods() {
        let guarded = router()
            .oneshot(request(Method::PUT, "/api/users", r#"{"email":"a@b.co"}"#))
            .await
            .unwrap();
        assert_eq!(guarded.status(), StatusCode::UNAUTHORIZED);

        let public = router()
            .oneshot(request(
                Method::POST,
                "/api/users",
                r#"{"email":"not-an-email","password":"x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(public.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reset_is_forbidden_on_prod() {
        let response = router()
            .oneshot(request(Method::POST, "/admin/reset", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
