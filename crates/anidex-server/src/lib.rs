//! anidex-server: HTTP front end for the anime catalog.
//!
//! Serves the catalog pages, the request and feedback forms, informational
//! pages, and static assets. Shuts down gracefully on SIGINT or SIGTERM.

pub mod client_ip;
pub mod context;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod views;

use std::net::SocketAddr;
use std::path::Path;

use anidex_core::Config;

use crate::context::AppContext;

/// Start the anidex server.
///
/// Checks secrets, prepares the data and covers directories, and serves until
/// a shutdown signal is received.
pub async fn start(config: Config) -> anidex_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }
    config.require_secrets()?;

    ensure_dir(&config.server.data_dir)?;
    ensure_dir(&config.covers_dir())?;

    let catalog = anidex_core::Catalog::load(&config.catalog_path());
    tracing::info!(
        "Catalog at {} has {} entries",
        config.catalog_path().display(),
        catalog.len()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anidex_core::Error::Config(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(config);
    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anidex_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anidex_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn ensure_dir(dir: &Path) -> anidex_core::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        tracing::info!("Created directory {}", dir.display());
    }
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
