//! SHA-256 integrity digests

use sha2::{Digest, Sha256};

/// Length of a rendered digest (32 bytes as hex)
pub const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of exactly `data`
pub fn digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// True when `data` hashes to `expected` (case-insensitive hex)
pub fn verify(data: &[u8], expected: &str) -> bool {
    digest(data).eq_ignore_ascii_case(expected)
}
