//! Storage Module
//!
//! Durable backing directory for persisted objects.
//!
//! ## Responsibilities
//! - Create the storage directory on startup
//! - Write and read whole object files
//! - Enumerate existing objects for cache rehydration
//!
//! ## Directory Layout
//! ```text
//! {storage_dir}/
//!   ├── <key>        zstd frame of the original payload
//!   ├── <key>
//!   └── ...          (flat; no sidecar metadata, no persisted digests)
//! ```
//!
//! Only the background worker writes here. Request threads read without
//! file-level locking, and writes are in-place (no rename), so a crash
//! mid-write can leave a truncated file. The zstd frame checksum catches it.

mod disk;

pub use disk::DiskStore;
