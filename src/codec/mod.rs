//! Codec Module
//!
//! Payload transforms applied between the caller's bytes and what lives in
//! the cache and on disk.
//!
//! ## Responsibilities
//! - Lossless compression (zstd, maximum ratio by default)
//! - Integrity digests (SHA-256, lowercase hex) over compressed bytes
//!
//! ## Stored Form
//! ```text
//! caller bytes ──compress──▶ zstd frame (+ content checksum) ──▶ cache / file
//!                                   │
//!                                   └──digest──▶ hex SHA-256 (memory only)
//! ```

mod compress;
mod digest;

pub use compress::Codec;
pub use digest::{digest, verify, DIGEST_HEX_LEN};
