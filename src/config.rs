//! Configuration for ObjectVault
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, VaultError};

/// Main configuration for an ObjectVault instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Flat directory holding one file per key:
    ///   {storage_dir}/
    ///     ├── report.pdf    (zstd-compressed payload)
    ///     └── avatar.png
    pub storage_dir: PathBuf,

    /// zstd level used for every payload
    pub compression_level: i32,

    // -------------------------------------------------------------------------
    // Write Queue Configuration
    // -------------------------------------------------------------------------
    /// Max writes accepted but not yet picked up by the worker
    pub queue_capacity: usize,

    /// How long Shutdown waits for pending writes. `None` abandons them.
    pub shutdown_drain_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,

    /// Deadline given to each upload while waiting for queue space
    pub enqueue_timeout: Duration,

    /// Largest accepted upload body (bytes)
    pub max_body_bytes: usize,

    // -------------------------------------------------------------------------
    // Runtime Environment
    // -------------------------------------------------------------------------
    pub environment: Environment,
}

/// Deployment environment, selects the log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Environment {
    /// Human-readable logs, debug level
    #[default]
    Local,

    /// JSON logs, debug level
    Dev,

    /// JSON logs, info level
    Prod,
}

/// Highest zstd level; favours ratio over speed
pub fn max_compression_level() -> i32 {
    zstd::zstd_safe::max_c_level()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./storage"),
            compression_level: max_compression_level(),
            queue_capacity: 100,
            shutdown_drain_timeout: None,
            listen_addr: "0.0.0.0:8080".to_string(),
            enqueue_timeout: Duration::from_secs(5),
            max_body_bytes: 64 * 1024 * 1024, // 64 MB
            environment: Environment::Local,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(VaultError::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }

        let levels = zstd::compression_level_range();
        if !levels.contains(&self.compression_level) {
            return Err(VaultError::Config(format!(
                "compression_level {} outside {}..={}",
                self.compression_level,
                levels.start(),
                levels.end()
            )));
        }

        if self.max_body_bytes == 0 {
            return Err(VaultError::Config(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage directory
    pub fn storage_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = path.into();
        self
    }

    /// Set the zstd compression level
    pub fn compression_level(mut self, level: i32) -> Self {
        self.config.compression_level = level;
        self
    }

    /// Set the write queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Drain pending writes for up to `timeout` on shutdown
    pub fn shutdown_drain_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_drain_timeout = Some(timeout);
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the per-upload enqueue deadline
    pub fn enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.config.enqueue_timeout = timeout;
        self
    }

    /// Set the maximum upload size (in bytes)
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Set the runtime environment
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
