//! MedQR server
//!
//! Hospital patient registry with QR-code emergency access.

use clap::Parser;
use medqr_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "sqlite")]
use medqr_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    info!(database = %config.database_url, "Initializing SQLite backend");

    let backend = SqliteBackend::with_config(&config.database_url, SqliteBackendConfig::default())?;
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server and runs until Ctrl-C.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        upload_dir = %config.upload_dir.display(),
        "Starting MedQR server"
    );

    start_sqlite(config).await
}

/// Starts the server with the SQLite backend.
#[cfg(feature = "sqlite")]
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    medqr_rest::bootstrap::ensure_super_admin(&backend, &config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to provision owner account: {}", e))?;

    let app = create_app_with_config(backend, config.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;
    serve(app, &config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p medqr-server --features sqlite"
    )
}
