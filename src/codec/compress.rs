//! zstd compression
//!
//! Frames are written with the zstd content checksum so a damaged payload
//! fails to decode instead of producing wrong bytes.

use std::io::Write;

use crate::config::max_compression_level;
use crate::error::{Result, VaultError};

/// Deterministic compress/decompress pair
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    level: i32,
}

impl Codec {
    /// Codec at the given zstd level
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    /// The zstd level in use
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Compress `data` into a single checksummed zstd frame
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), self.level)
            .map_err(compression_failure)?;
        encoder.include_checksum(true).map_err(compression_failure)?;
        encoder.write_all(data).map_err(compression_failure)?;
        encoder.finish().map_err(compression_failure)
    }

    /// Exact inverse of `compress`
    ///
    /// Any failure (bad magic, truncated frame, checksum mismatch) is a
    /// `Compression` error, never `NotFound`.
    pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        zstd::stream::decode_all(compressed).map_err(compression_failure)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(max_compression_level())
    }
}

fn compression_failure(e: std::io::Error) -> VaultError {
    VaultError::Compression(e.to_string())
}
