//! ObjectVault Server Binary
//!
//! Starts the HTTP server for ObjectVault.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use objectvault::http::{shutdown_signal, HttpServer};
use objectvault::{Config, Environment, StorageEngine};
use tracing_subscriber::{fmt, EnvFilter};

/// ObjectVault Server
#[derive(Parser, Debug)]
#[command(name = "objectvault-server")]
#[command(about = "Object store with a write-behind cache and HTTP API")]
#[command(version)]
struct Args {
    /// Storage directory
    #[arg(short, long, env = "OBJECTVAULT_STORAGE_DIR", default_value = "./storage")]
    storage_dir: PathBuf,

    /// Listen address (host:port)
    #[arg(short, long, env = "OBJECTVAULT_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Write queue capacity
    #[arg(short, long, env = "OBJECTVAULT_QUEUE_CAPACITY", default_value = "100")]
    queue_capacity: usize,

    /// zstd compression level (defaults to the maximum)
    #[arg(short = 'z', long, env = "OBJECTVAULT_COMPRESSION_LEVEL")]
    compression_level: Option<i32>,

    /// Seconds an upload may wait for queue space
    #[arg(long, env = "OBJECTVAULT_ENQUEUE_TIMEOUT_SECS", default_value = "5")]
    enqueue_timeout_secs: u64,

    /// Maximum upload size in MB
    #[arg(long, env = "OBJECTVAULT_MAX_BODY_MB", default_value = "64")]
    max_body_mb: usize,

    /// Seconds to wait for pending writes on shutdown (0 abandons them)
    #[arg(long, env = "OBJECTVAULT_DRAIN_TIMEOUT_SECS", default_value = "10")]
    drain_timeout_secs: u64,

    /// Runtime environment (selects log format)
    #[arg(short, long, env = "OBJECTVAULT_ENV", value_enum, default_value = "local")]
    env: Environment,
}

impl Args {
    fn into_config(self) -> Config {
        let mut builder = Config::builder()
            .storage_dir(self.storage_dir)
            .listen_addr(self.listen)
            .queue_capacity(self.queue_capacity)
            .enqueue_timeout(Duration::from_secs(self.enqueue_timeout_secs))
            .max_body_bytes(self.max_body_mb * 1024 * 1024)
            .environment(self.env);

        if let Some(level) = self.compression_level {
            builder = builder.compression_level(level);
        }
        if self.drain_timeout_secs > 0 {
            builder = builder.shutdown_drain_timeout(Duration::from_secs(self.drain_timeout_secs));
        }

        builder.build()
    }
}

/// Initialize tracing/logging for the given environment
fn init_tracing(env: Environment) {
    let default_filter = match env {
        Environment::Local | Environment::Dev => "info,objectvault=debug",
        Environment::Prod => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    match env {
        Environment::Local => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init(),
        Environment::Dev | Environment::Prod => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.env);

    let config = args.into_config();

    tracing::info!("ObjectVault Server v{}", objectvault::VERSION);
    tracing::info!("Storage directory: {}", config.storage_dir.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    // Open engine (startup scan happens on a blocking thread)
    let engine_config = config.clone();
    let engine = match tokio::task::spawn_blocking(move || StorageEngine::open(engine_config)).await {
        Ok(Ok(engine)) => Arc::new(engine),
        Ok(Err(e)) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Engine startup task failed: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = HttpServer::new(config, Arc::clone(&engine));
    let listener = match server.bind().await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("{}", e);
            engine.shutdown();
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve_with_shutdown(listener, shutdown_signal()).await {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("HTTP server stopped, shutting down storage engine");
    let stopping = Arc::clone(&engine);
    if let Err(e) = tokio::task::spawn_blocking(move || stopping.shutdown()).await {
        tracing::error!("Engine shutdown task failed: {}", e);
    }

    tracing::info!("Server stopped");
}
