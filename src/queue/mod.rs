//! Write Queue Module
//!
//! Bounded FIFO hand-off between request threads and the persist worker.
//!
//! ## Responsibilities
//! - Decouple Save latency from disk writes
//! - Apply backpressure when the worker falls behind
//! - Track accepted-but-unattempted writes (for `sync` and shutdown)
//!
//! ## Ordering
//! One global FIFO across all keys. Two saves of the same key are persisted
//! in enqueue order, but the cache sees each save before the disk does.

mod cancel;
mod channel;

pub use cancel::{CancelHandle, CancelToken};
pub use channel::{QueueReceiver, WriteQueue};

use bytes::Bytes;

/// Default number of queued writes before Save blocks
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// One pending durable write
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Target key (already validated)
    pub key: String,

    /// Compressed payload, shared with the cache entry
    pub data: Bytes,

    /// Hex SHA-256 of `data`
    pub digest: String,
}
