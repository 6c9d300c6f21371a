use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::engine::StorageEngine;
use crate::error::{Result, VaultError};

use super::router::{build_router, AppState};

/// HTTP server for ObjectVault
pub struct HttpServer {
    config: Config,
    engine: Arc<StorageEngine>,
}

impl HttpServer {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<StorageEngine>) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(
            AppState::new(Arc::clone(&self.engine), &self.config),
            self.config.max_body_bytes,
        )
    }

    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|e| VaultError::Server(format!("cannot bind {}: {e}", self.config.listen_addr)))
    }

    /// Serve until `signal` resolves, then let in-flight requests finish
    ///
    /// Does not shut the engine down; the caller owns that step.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = listener.local_addr()?;
        tracing::info!("ObjectVault listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| VaultError::Server(e.to_string()))
    }

    /// Bind and serve until Ctrl+C
    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }
}

/// Resolves on Ctrl+C (or SIGTERM on Unix)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, initiating shutdown..."),
    }
}
