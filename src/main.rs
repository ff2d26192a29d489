//! Unilet Presence Server — real-time presence and activity tracking
//! for the Unilet student lettings platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use unilet_api::{AppState, build_router};
use unilet_core::config::AppConfig;
use unilet_core::error::AppError;
use unilet_presence::PresenceService;
use unilet_presence::broadcast::AllConnections;
use unilet_presence::heartbeat;
use unilet_presence::store::DbStatusStore;
use unilet_presence::verify::AcceptAllVerifier;

#[tokio::main]
async fn main() {
    let env = std::env::var("UNILET_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Unilet presence server v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    tracing::info!("Connecting to database...");
    let db_pool = unilet_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    unilet_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Presence engine ──────────────────────────────────────────
    let store = Arc::new(DbStatusStore::new(db_pool.clone()));
    let service = Arc::new(PresenceService::new(
        store,
        Arc::new(AcceptAllVerifier),
        Arc::new(AllConnections),
        config.presence.clone(),
    ));

    // Clear any state left over from an unclean previous run.
    service.shutdown().await;

    // ── Heartbeat supervisor ─────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let supervisor = tokio::spawn(heartbeat::run_supervisor(
        Arc::clone(&service),
        shutdown_rx,
    ));

    // ── HTTP server ──────────────────────────────────────────────
    let app = build_router(AppState::new(Arc::clone(&service)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Unilet presence server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Teardown ─────────────────────────────────────────────────
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), supervisor).await;

    // Hard reset: force every user offline and drop connection rows so
    // the next boot starts from a clean slate.
    service.shutdown().await;

    tracing::info!("Unilet presence server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
