//! Expected digests
//!
//! Digest of the last version of each key the worker handed to the disk.
//! Lives only in memory; the disk holds payloads alone.
//!
//! The map lock also orders disk access for a key: the worker writes while
//! holding it exclusively, and cold reads hold it shared, so a reader never
//! compares a fresh file against a stale digest or the reverse.

use std::collections::HashMap;

use parking_lot::RwLock;

#[derive(Debug, Default)]
pub(crate) struct DigestLedger {
    digests: RwLock<HashMap<String, String>>,
}

impl DigestLedger {
    pub(crate) fn record(&self, key: &str, digest: String) {
        self.digests.write().insert(key.to_string(), digest);
    }

    /// Record only if no digest is known yet
    pub(crate) fn record_if_absent(&self, key: &str, digest: String) {
        self.digests
            .write()
            .entry(key.to_string())
            .or_insert(digest);
    }

    /// Run a disk write, then record `digest` for `key` before any reader
    /// can look at the result
    pub(crate) fn record_around<T>(&self, key: &str, digest: String, write: impl FnOnce() -> T) -> T {
        let mut digests = self.digests.write();
        let outcome = write();
        digests.insert(key.to_string(), digest);
        outcome
    }

    /// Run a disk read with the expected digest for `key` held stable
    ///
    /// `read` must not call back into the ledger.
    pub(crate) fn with_expected<T>(&self, key: &str, read: impl FnOnce(Option<&str>) -> T) -> T {
        let digests = self.digests.read();
        read(digests.get(key).map(String::as_str))
    }

    pub(crate) fn len(&self) -> usize {
        self.digests.read().len()
    }
}
