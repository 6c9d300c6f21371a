//! MemoryCache Tests
//!
//! Tests verify:
//! - Basic get/put/delete
//! - Size tracking
//! - Conditional insert/remove used by the engine's race handling
//! - keys() is a snapshot
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use objectvault::cache::MemoryCache;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_cache_is_empty() {
    let cache = MemoryCache::new();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.size(), 0);
    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
}

#[test]
fn test_put_and_get() {
    let cache = MemoryCache::new();

    assert!(cache.put("key1", Bytes::from_static(b"value1")).is_none());

    assert_eq!(cache.get("key1"), Some(Bytes::from_static(b"value1")));
    assert!(cache.contains("key1"));
}

#[test]
fn test_get_nonexistent_key() {
    let cache = MemoryCache::new();
    assert_eq!(cache.get("nonexistent"), None);
}

#[test]
fn test_put_overwrites_existing() {
    let cache = MemoryCache::new();

    cache.put("key1", Bytes::from_static(b"value1"));
    let previous = cache.put("key1", Bytes::from_static(b"v2"));

    assert_eq!(previous, Some(Bytes::from_static(b"value1")));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.size(), 2);
    assert_eq!(cache.get("key1"), Some(Bytes::from_static(b"v2")));
}

#[test]
fn test_delete() {
    let cache = MemoryCache::new();

    cache.put("key1", Bytes::from_static(b"value1"));
    assert_eq!(cache.delete("key1"), Some(Bytes::from_static(b"value1")));

    assert!(cache.get("key1").is_none());
    assert_eq!(cache.size(), 0);
    assert!(cache.delete("key1").is_none());
}

#[test]
fn test_size_tracks_all_entries() {
    let cache = MemoryCache::new();

    cache.put("a", Bytes::from(vec![0u8; 10]));
    cache.put("b", Bytes::from(vec![0u8; 20]));
    assert_eq!(cache.size(), 30);

    cache.delete("a");
    assert_eq!(cache.size(), 20);
}

// =============================================================================
// Conditional Operations Tests
// =============================================================================

#[test]
fn test_put_if_absent_does_not_overwrite() {
    let cache = MemoryCache::new();

    assert!(cache.put_if_absent("k", Bytes::from_static(b"first")));
    assert!(!cache.put_if_absent("k", Bytes::from_static(b"second")));

    assert_eq!(cache.get("k"), Some(Bytes::from_static(b"first")));
}

#[test]
fn test_remove_if_same_matches_buffer_identity() {
    let cache = MemoryCache::new();
    let original = Bytes::from(b"payload".to_vec());
    cache.put("k", original.clone());

    // Equal contents in a different allocation is a different entry
    let lookalike = Bytes::from(b"payload".to_vec());
    assert!(!cache.remove_if_same("k", &lookalike));
    assert!(cache.contains("k"));

    assert!(cache.remove_if_same("k", &original));
    assert!(!cache.contains("k"));
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_remove_if_same_spares_newer_entry() {
    let cache = MemoryCache::new();
    let old = Bytes::from(b"v1".to_vec());
    cache.put("k", old.clone());
    cache.put("k", Bytes::from(b"v2".to_vec()));

    assert!(!cache.remove_if_same("k", &old));
    assert_eq!(cache.get("k"), Some(Bytes::from_static(b"v2")));
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_keys_are_sorted_snapshot() {
    let cache = MemoryCache::new();
    cache.put("c", Bytes::new());
    cache.put("a", Bytes::new());
    cache.put("b", Bytes::new());

    let snapshot = cache.keys();
    cache.put("d", Bytes::new());
    cache.delete("a");

    let keys: Vec<_> = snapshot.into_iter().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let cache = Arc::new(MemoryCache::new());
    let mut handles = Vec::new();

    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                let key = format!("t{t}-k{i}");
                cache.put(key.clone(), Bytes::from(vec![t as u8; 4]));
                assert!(cache.get(&key).is_some());
            }
        }));
    }

    for _ in 0..2 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let _ = cache.keys();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 1000);
    assert_eq!(cache.size(), 4000);
}
