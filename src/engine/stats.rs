//! Engine counters
//!
//! Relaxed atomics; values are monotonic and only read for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct EngineStats {
    pub(crate) saves: AtomicU64,
    pub(crate) loads: AtomicU64,
    pub(crate) cache_hits: AtomicU64,
    pub(crate) cache_misses: AtomicU64,
    pub(crate) persisted: AtomicU64,
    pub(crate) persist_failures: AtomicU64,
    pub(crate) cancelled: AtomicU64,
    pub(crate) integrity_failures: AtomicU64,
}

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatsSnapshot {
    /// Saves acknowledged to the caller
    pub saves: u64,
    /// Loads that passed key validation
    pub loads: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Writes the worker completed on disk
    pub persisted: u64,
    /// Writes the worker failed (entry evicted)
    pub persist_failures: u64,
    /// Saves rolled back because the enqueue was cancelled
    pub cancelled: u64,
    /// Digest mismatches and undecodable payloads seen by Load
    pub integrity_failures: u64,
}

impl EngineStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EngineStatsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        EngineStatsSnapshot {
            saves: get(&self.saves),
            loads: get(&self.loads),
            cache_hits: get(&self.cache_hits),
            cache_misses: get(&self.cache_misses),
            persisted: get(&self.persisted),
            persist_failures: get(&self.persist_failures),
            cancelled: get(&self.cancelled),
            integrity_failures: get(&self.integrity_failures),
        }
    }
}
