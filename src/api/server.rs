//! Server lifecycle: migrate the database, bind, serve until Ctrl-C.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::router::api_router;
use crate::api::types::ApiContext;
use crate::config::ServerConfig;
use crate::db::SqliteStore;

/// Bind the listener for `config`. Migrations run before the first
/// request so handlers never race on schema setup.
pub async fn bind(config: &ServerConfig) -> Result<(TcpListener, SocketAddr), String> {
    SqliteStore::open(&config.database_path)
        .map_err(|e| format!("Cannot open database {}: {e}", config.database_path.display()))?;

    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {e}", config.addr))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {e}"))?;
    Ok((listener, addr))
}

/// Serve the API on an already bound listener until shutdown.
pub async fn serve(listener: TcpListener, config: ServerConfig) -> Result<(), String> {
    let ctx = ApiContext::new(config.database_path.clone(), config.capacity);
    let router = api_router(ctx);

    tracing::info!(
        addr = %config.addr,
        database = %config.database_path.display(),
        "Wardline API listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    tracing::info!("Wardline API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
