use std::sync::Arc;
use std::time::Duration;

use chirpy_service::config::Config;
use chirpy_service::inbound::http::router::create_router;
use chirpy_service::inbound::http::router::AppState;
use chirpy_service::inbound::sweeper::spawn_refresh_token_sweeper;
use chirpy_service::outbound::in_memory::InMemoryChirpRepository;
use chirpy_service::outbound::in_memory::InMemoryRefreshTokenStore;
use chirpy_service::outbound::in_memory::InMemoryUserRepository;
use chirpy_service::outbound::repositories::PostgresChirpRepository;
use chirpy_service::outbound::repositories::PostgresRefreshTokenStore;
use chirpy_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "chirpy-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        filepath_root = %config.server.filepath_root,
        platform = ?config.server.platform,
        rotation = ?config.session.rotation,
        "Configuration loaded"
    );

    let state = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            AppState::assemble(
                &config,
                Arc::new(PostgresUserRepository::new(pg_pool.clone())),
                Arc::new(PostgresChirpRepository::new(pg_pool.clone())),
                Arc::new(PostgresRefreshTokenStore::new(pg_pool)),
            )?
        }
        None => {
            tracing::warn!(
                storage = "in-memory",
                "No database configured, data will not survive a restart"
            );

            AppState::assemble(
                &config,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryChirpRepository::new()),
                Arc::new(InMemoryRefreshTokenStore::new()),
            )?
        }
    };

    let sweeper = spawn_refresh_token_sweeper(
        Arc::clone(&state.session_service),
        Duration::from_secs(config.session.sweep_interval_secs),
    );
    tracing::info!(
        interval_secs = config.session.sweep_interval_secs,
        "Refresh token sweeper started"
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state, &config.server.filepath_root);

    let result = axum::serve(http_listener, http_application).await;
    sweeper.abort();

    match result {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(ref e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(result?)
}
