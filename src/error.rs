//! Error types for ObjectVault
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for ObjectVault operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("invalid key")]
    InvalidKey,

    #[error("storage not ready")]
    StorageNotReady,

    #[error("enqueue cancelled before the write queue accepted the object")]
    Cancelled,

    #[error("object not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("data integrity check failed: expected digest {expected}, computed {computed}")]
    DataCorrupted { expected: String, computed: String },

    #[error("compression/decompression failed: {0}")]
    Compression(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration / Server Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl VaultError {
    /// True for plain absence (never stored, or downgraded read failure)
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::NotFound)
    }
}
