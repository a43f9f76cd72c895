// Server module - TCP listener and graceful shutdown around the axum app

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::ProxyError;
use crate::metrics::Metrics;
use crate::proxy::build_app;

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn run(config: &Config) -> Result<(), ProxyError> {
    let metrics = Arc::new(Metrics::new());
    let app = build_app(config, metrics)?;

    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| ProxyError::Config(format!("failed to bind {}: {}", listen_addr, e)))?;

    tracing::info!(
        address = %listen_addr,
        origin = %config.origin.url,
        "Starting Utsushi image proxy"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProxyError::Internal(format!("server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
