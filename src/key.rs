//! Key Validation
//!
//! A key names exactly one file inside the storage directory, so it must be
//! a single, non-special path segment.

use std::path::{Component, Path};

use crate::error::{Result, VaultError};

/// Longest accepted key, in bytes
pub const MAX_KEY_LEN: usize = 1024;

/// Validate a caller-supplied key
///
/// Rejects:
/// - the empty string and anything longer than `MAX_KEY_LEN` bytes
/// - keys containing `/`, `\` or NUL
/// - `.` and `..`, or anything else that does not parse as one normal segment
///
/// Pure function: the answer never depends on what is stored.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(VaultError::InvalidKey);
    }

    // Backslash is a separator on Windows; refuse it everywhere so the
    // on-disk layout stays portable.
    if key.contains(['/', '\\', '\0']) {
        return Err(VaultError::InvalidKey);
    }

    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment.to_str() == Some(key) => Ok(()),
        _ => Err(VaultError::InvalidKey),
    }
}

/// Convenience predicate over `validate_key`
pub fn is_valid_key(key: &str) -> bool {
    validate_key(key).is_ok()
}
