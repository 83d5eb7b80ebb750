use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tokio::signal;

use template_service::{
    config::AppConfig,
    metrics::HttpMetrics,
    models::file::File,
    repository::{FileRepository, PgRepository, PgUserRepository, UserRepository},
    routes::create_router,
    services::{
        auth_client::{AuthProvider, HttpAuthClient},
        database::Database,
    },
    utils, AppState,
};

/// Graceful shutdown signal handler
///
/// Resolves on Ctrl+C or SIGTERM so in-flight requests can complete.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);
    utils::logging::init_logging(&config.logging)?;
    config.log_summary();

    let auth_client = HttpAuthClient::new(&config.auth)?;
    auth_client
        .health_check()
        .await
        .context("auth service health check failed")?;
    let auth: Arc<dyn AuthProvider> = Arc::new(auth_client);

    let database = Database::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    database.migrate().await.context("failed to run migrations")?;

    let files: Arc<FileRepository> = Arc::new(PgRepository::<File>::new(database.pool().clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(database.pool().clone()));
    let metrics = Arc::new(HttpMetrics::new().context("failed to register metrics")?);
    let state = AppState::new(config.clone(), files, users, auth, metrics);

    let app = create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
