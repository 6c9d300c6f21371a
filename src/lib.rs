//! # ObjectVault
//!
//! A process-local object store with:
//! - Write-behind cache: saves are acknowledged from memory
//! - Background persistence through a bounded, backpressured queue
//! - zstd-compressed payloads with SHA-256 integrity checks on read-back
//! - HTTP API for upload, download and listing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │            /upload/{key}  /download/{key}  /list             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   StorageEngine                              │
//! │        validate key → compress + digest → cache              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryCache │          │ WriteQueue  │
//!   │  (RwLock)   │          │ (bounded)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ persist worker
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  DiskStore  │
//!                           │ (flat dir)  │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod codec;
pub mod cache;
pub mod queue;
pub mod storage;
pub mod engine;
pub mod http;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{VaultError, Result};
pub use config::{Config, Environment};
pub use engine::{EngineStatsSnapshot, StorageEngine};
pub use queue::{CancelHandle, CancelToken};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ObjectVault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
