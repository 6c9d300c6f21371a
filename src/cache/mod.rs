//! Cache Module
//!
//! In-memory map of key → compressed payload.
//!
//! ## Responsibilities
//! - Fast path for reads
//! - Record of acknowledged writes (an entry may not be durable yet)
//! - Point-in-time key snapshots for List
//!
//! ## Data Structure Choice
//! HashMap wrapped in a parking_lot RwLock:
//! - Many concurrent readers, one writer at a time
//! - Values are `Bytes`, so handing a payload to the write queue or a
//!   reader is a refcount bump, not a copy
//! - Future: shard by key hash if write contention shows up

mod table;

pub use table::MemoryCache;
