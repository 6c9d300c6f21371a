//! MemoryCache implementation
//!
//! HashMap-based cache with RwLock for concurrency.

use std::collections::{BTreeSet, HashMap};

use bytes::Bytes;
use parking_lot::RwLock;

/// Concurrent key → compressed bytes map
///
/// Every mutation takes the write lock; lookups and snapshots take the read
/// lock. `size` is maintained under the same write lock as the map.
#[derive(Default)]
pub struct MemoryCache {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Bytes>,
    /// Sum of cached payload lengths (bytes)
    size: usize,
}

impl MemoryCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compressed bytes for `key` (read lock)
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Check whether `key` is cached (read lock)
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    /// Insert or overwrite `key` (write lock)
    ///
    /// Returns the previous value, if any.
    pub fn put(&self, key: impl Into<String>, value: Bytes) -> Option<Bytes> {
        let mut inner = self.inner.write();
        inner.size += value.len();
        let previous = inner.entries.insert(key.into(), value);
        if let Some(old) = &previous {
            inner.size -= old.len();
        }
        previous
    }

    /// Remove `key` (write lock)
    ///
    /// Returns the removed value, if any.
    pub fn delete(&self, key: &str) -> Option<Bytes> {
        let mut inner = self.inner.write();
        let removed = inner.entries.remove(key);
        if let Some(old) = &removed {
            inner.size -= old.len();
        }
        removed
    }

    /// Insert `key` only if nothing is cached for it (write lock)
    ///
    /// Returns true if the value was inserted. A disk read that loses the
    /// race against a concurrent Save must not overwrite the newer bytes.
    pub fn put_if_absent(&self, key: &str, value: Bytes) -> bool {
        let mut inner = self.inner.write();
        if inner.entries.contains_key(key) {
            return false;
        }
        inner.size += value.len();
        inner.entries.insert(key.to_string(), value);
        true
    }

    /// Remove `key` only while it still holds this exact buffer (write lock)
    ///
    /// Identity is the `Bytes` allocation, not its contents: a later Save of
    /// the same key owns a different buffer and is left alone.
    pub fn remove_if_same(&self, key: &str, value: &Bytes) -> bool {
        let mut inner = self.inner.write();
        let same = inner
            .entries
            .get(key)
            .is_some_and(|current| current.as_ptr() == value.as_ptr() && current.len() == value.len());
        if same {
            inner.entries.remove(key);
            inner.size -= value.len();
        }
        same
    }

    /// Sorted point-in-time snapshot of cached keys
    ///
    /// Later mutations are not reflected in the returned set.
    pub fn keys(&self) -> BTreeSet<String> {
        self.inner.read().entries.keys().cloned().collect()
    }

    /// Get the entry count
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Total cached payload size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryCache")
            .field("entries", &inner.entries.len())
            .field("size", &inner.size)
            .finish()
    }
}
