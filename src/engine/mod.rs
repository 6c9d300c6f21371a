//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate keys and compress/digest payloads
//! - Acknowledge saves from the cache, persist them in the background
//! - Serve loads from cache, falling back to verified disk reads
//! - Rehydrate the cache from disk on startup

mod ledger;
mod stats;
mod worker;

pub use stats::EngineStatsSnapshot;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::cache::MemoryCache;
use crate::codec::{self, Codec};
use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::key::validate_key;
use crate::queue::{CancelToken, QueueReceiver, WriteQueue, WriteRequest};
use crate::storage::DiskStore;

use ledger::DigestLedger;
use stats::EngineStats;
use worker::{Control, PersistWorker};

/// State shared between request threads and the persist worker
pub(crate) struct Shared {
    pub(crate) disk: DiskStore,
    pub(crate) cache: MemoryCache,
    pub(crate) ledger: DigestLedger,
    pub(crate) stats: EngineStats,
}

/// Where the engine is in its one-way lifecycle
enum Lifecycle {
    /// Constructed; the worker's channel ends wait here until `start`
    Created {
        requests: QueueReceiver,
        control: Receiver<Control>,
    },
    Running {
        worker: JoinHandle<()>,
    },
    Stopped,
}

/// The main storage engine
///
/// ## Concurrency Model: Write-Behind Cache + Single Persist Worker
///
/// - **Save**: compress → digest → cache insert (visible immediately) →
///   enqueue. Blocks only while the queue is full, bounded by the caller's
///   `CancelToken`. Success means *accepted*, not *durable*.
///
/// - **Load**: cache hit is served under the cache read lock. On a miss the
///   file is read under the ledger read lock, checked against the expected
///   digest, decompressed and cached.
///
/// - **Worker**: the only disk writer. Drains the queue in FIFO order and
///   records each request's digest under the ledger write lock, so the
///   ledger follows disk order. A failed write evicts its cache entry so the
///   object stops being served.
///
/// Construct once and share it (`Arc<StorageEngine>`) with every handler.
pub struct StorageEngine {
    /// Engine configuration
    config: Config,

    /// Compression settings
    codec: Codec,

    /// Cache, ledger, counters and disk handle (shared with the worker)
    shared: Arc<Shared>,

    /// Producer side of the write queue
    queue: WriteQueue,

    /// Worker control channel
    control: Sender<Control>,

    /// Set once startup completes, cleared only by shutdown
    ready: AtomicBool,

    /// Serializes start/shutdown
    lifecycle: Mutex<Lifecycle>,
}

impl StorageEngine {
    /// Create an engine that is not ready yet
    ///
    /// Nothing touches the filesystem until `start`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let (queue, requests) = WriteQueue::bounded(config.queue_capacity);
        let (control, control_rx) = channel::unbounded();

        let shared = Arc::new(Shared {
            disk: DiskStore::new(&config.storage_dir),
            cache: MemoryCache::new(),
            ledger: DigestLedger::default(),
            stats: EngineStats::default(),
        });

        Ok(Self {
            codec: Codec::new(config.compression_level),
            config,
            shared,
            queue,
            control,
            ready: AtomicBool::new(false),
            lifecycle: Mutex::new(Lifecycle::Created {
                requests,
                control: control_rx,
            }),
        })
    }

    /// Create and start an engine with the given config
    pub fn open(config: Config) -> Result<Self> {
        let engine = Self::new(config)?;
        engine.start()?;
        Ok(engine)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified storage directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().storage_dir(path).build())
    }

    /// Run startup
    ///
    /// 1. Create the storage directory (fatal on failure)
    /// 2. Load every object file into the cache
    /// 3. Mark ready
    /// 4. Spawn the persist worker
    ///
    /// No-op when already running; `StorageNotReady` after shutdown.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();

        let (requests, control) = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Created { requests, control } => (requests, control),
            running @ Lifecycle::Running { .. } => {
                *lifecycle = running;
                return Ok(());
            }
            Lifecycle::Stopped => return Err(VaultError::StorageNotReady),
        };

        // Steps 1-2: directory + rehydration; a failed start can be retried
        if let Err(e) = self.prepare_storage() {
            *lifecycle = Lifecycle::Created { requests, control };
            return Err(e);
        }

        // Step 3: ready
        self.ready.store(true, Ordering::SeqCst);

        // Step 4: worker
        let worker = PersistWorker::new(requests, control, Arc::clone(&self.shared));
        let spawned = thread::Builder::new()
            .name("objectvault-persist".to_string())
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => {
                *lifecycle = Lifecycle::Running { worker: handle };
                tracing::info!(
                    dir = %self.config.storage_dir.display(),
                    objects = self.shared.cache.len(),
                    "Storage engine ready"
                );
                Ok(())
            }
            Err(e) => {
                self.ready.store(false, Ordering::SeqCst);
                Err(VaultError::Io(e))
            }
        }
    }

    /// Save `data` under `key`
    ///
    /// Steps:
    /// 1. Check readiness and key
    /// 2. Compress + digest
    /// 3. Insert into cache (optimistic acknowledgment)
    /// 4. Enqueue for the worker; on failure roll back step 3
    pub fn save(&self, key: &str, data: &[u8], cancel: &CancelToken) -> Result<()> {
        self.ensure_ready()?;
        validate_key(key)?;

        // Step 2: compress + digest
        let compressed = match self.codec.compress(data) {
            Ok(compressed) => Bytes::from(compressed),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to compress data");
                return Err(e);
            }
        };
        let digest = codec::digest(&compressed);

        // Step 3: visible to readers from here on
        self.shared.cache.put(key, compressed.clone());

        // Step 4: hand off to the worker
        let request = WriteRequest {
            key: key.to_string(),
            data: compressed.clone(),
            digest,
        };

        if let Err(e) = self.queue.enqueue(request, cancel) {
            self.shared.cache.remove_if_same(key, &compressed);
            if matches!(e, VaultError::Cancelled) {
                EngineStats::bump(&self.shared.stats.cancelled);
            }
            tracing::warn!(key = %key, error = %e, "Write not queued, cache entry rolled back");
            return Err(e);
        }

        EngineStats::bump(&self.shared.stats.saves);
        tracing::debug!(key = %key, raw = data.len(), compressed = compressed.len(), "Object saved");
        Ok(())
    }

    /// Load the original bytes stored under `key`
    ///
    /// Search order:
    /// 1. Cache
    /// 2. Storage directory (digest-checked, then cached)
    ///
    /// Corruption and disk errors are logged and reported as `NotFound`.
    /// Never blocks on the write queue, so `_cancel` is not consulted.
    pub fn load(&self, key: &str, _cancel: &CancelToken) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        if let Err(e) = validate_key(key) {
            tracing::warn!(key = %key, "Invalid key");
            return Err(e);
        }

        EngineStats::bump(&self.shared.stats.loads);

        // Step 1: cache
        if let Some(compressed) = self.shared.cache.get(key) {
            EngineStats::bump(&self.shared.stats.cache_hits);
            return self.codec.decompress(&compressed).map_err(|e| {
                EngineStats::bump(&self.shared.stats.integrity_failures);
                tracing::error!(key = %key, error = %e, "Failed to decompress cached data");
                VaultError::NotFound
            });
        }

        // Step 2: disk
        EngineStats::bump(&self.shared.stats.cache_misses);
        self.load_from_disk(key)
    }

    /// Keys the engine currently knows about, sorted
    ///
    /// Reflects the cache only: files dropped into the directory after
    /// startup are not listed until something loads them.
    pub fn list(&self) -> Result<Vec<String>> {
        self.ensure_ready()?;
        Ok(self.shared.cache.keys().into_iter().collect())
    }

    /// Drop the cached copy of `key`, keeping the file and its digest
    ///
    /// The next Load takes the verified disk path. Returns true if an entry
    /// was cached.
    pub fn evict(&self, key: &str) -> Result<bool> {
        self.ensure_ready()?;
        validate_key(key)?;
        Ok(self.shared.cache.delete(key).is_some())
    }

    /// Block until every write accepted so far has been attempted
    ///
    /// Returns false if `timeout` elapsed first (or the worker is paused).
    pub fn sync(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Stop the worker from taking queued writes
    ///
    /// Returns once the worker has acknowledged; an in-flight write is
    /// finished first. Saves keep succeeding until the queue fills.
    ///
    /// `StorageNotReady` unless the worker is running.
    pub fn pause_worker(&self) -> Result<()> {
        // Held across the ack so shutdown cannot stop the worker mid-handshake
        let lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Running { .. }) {
            return Err(VaultError::StorageNotReady);
        }

        let (ack, acked) = channel::bounded(1);
        self.control
            .send(Control::Pause(ack))
            .map_err(|_| VaultError::StorageNotReady)?;
        acked.recv().map_err(|_| VaultError::StorageNotReady)
    }

    /// Let a paused worker continue
    pub fn resume_worker(&self) -> Result<()> {
        let lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Running { .. }) {
            return Err(VaultError::StorageNotReady);
        }

        self.control
            .send(Control::Resume)
            .map_err(|_| VaultError::StorageNotReady)
    }

    /// Stop the engine
    ///
    /// Clears `ready`, optionally drains (see `Config::shutdown_drain_timeout`),
    /// signals the worker and waits for its thread to exit. Writes still
    /// queued after that are abandoned and logged. Idempotent.
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock();
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped);
        self.ready.store(false, Ordering::SeqCst);

        let worker = match previous {
            Lifecycle::Running { worker } => worker,
            Lifecycle::Created { .. } | Lifecycle::Stopped => return,
        };

        if let Some(timeout) = self.config.shutdown_drain_timeout {
            if !self.queue.wait_idle(timeout) {
                tracing::warn!(?timeout, "Write queue did not drain before shutdown timeout");
            }
        }

        let _ = self.control.send(Control::Stop);
        if worker.join().is_err() {
            tracing::error!("Persist worker panicked");
        }

        let abandoned = self.queue.pending();
        if abandoned > 0 {
            tracing::warn!(abandoned, "Shutdown abandoned queued writes; they were never persisted");
        }

        tracing::info!("Storage engine stopped");
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// True between startup and shutdown
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        self.shared.disk.dir()
    }

    /// Get the number of cached objects
    pub fn cached_entry_count(&self) -> usize {
        self.shared.cache.len()
    }

    /// Get the total size of cached (compressed) payloads
    pub fn cache_size(&self) -> usize {
        self.shared.cache.size()
    }

    /// Get the number of keys with a known digest
    pub fn known_digest_count(&self) -> usize {
        self.shared.ledger.len()
    }

    /// Accepted writes not yet attempted by the worker
    pub fn pending_writes(&self) -> usize {
        self.queue.pending()
    }

    /// Snapshot of the engine counters
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(VaultError::StorageNotReady)
        }
    }

    /// Create the directory and load every object file into the cache
    fn prepare_storage(&self) -> Result<()> {
        let disk = &self.shared.disk;
        disk.create_dir()?;

        for key in disk.list_directory()? {
            match disk.read_file(&key) {
                Ok(data) => {
                    self.shared.ledger.record(&key, codec::digest(&data));
                    self.shared.cache.put(key, Bytes::from(data));
                }
                Err(e) => {
                    tracing::warn!(file = %key, error = %e, "Failed to load file");
                }
            }
        }

        Ok(())
    }

    /// Cold path of Load; every failure becomes `NotFound`
    fn load_from_disk(&self, key: &str) -> Result<Vec<u8>> {
        // The worker cannot write this key while its expected digest is held
        let read = self.shared.ledger.with_expected(key, |expected| -> Result<(Vec<u8>, bool)> {
            let compressed = self.shared.disk.read_file(key)?;

            // Verify the bytes already in hand; never re-read the file
            match expected {
                Some(expected) if !codec::verify(&compressed, expected) => {
                    Err(VaultError::DataCorrupted {
                        expected: expected.to_string(),
                        computed: codec::digest(&compressed),
                    })
                }
                Some(_) => Ok((compressed, true)),
                None => Ok((compressed, false)),
            }
        });

        let (compressed, verified) = match read {
            Ok(read) => read,
            Err(VaultError::NotFound) => return Err(VaultError::NotFound),
            Err(error @ VaultError::DataCorrupted { .. }) => {
                EngineStats::bump(&self.shared.stats.integrity_failures);
                tracing::error!(key = %key, error = %error, "Data integrity check failed");
                return Err(VaultError::NotFound);
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read file from disk");
                return Err(VaultError::NotFound);
            }
        };

        let data = self.codec.decompress(&compressed).map_err(|e| {
            EngineStats::bump(&self.shared.stats.integrity_failures);
            tracing::error!(key = %key, error = %e, "Failed to decompress data");
            VaultError::NotFound
        })?;

        // Files written outside the engine get their first digest here
        let computed = (!verified).then(|| codec::digest(&compressed));
        if self.shared.cache.put_if_absent(key, Bytes::from(compressed)) {
            if let Some(computed) = computed {
                self.shared.ledger.record_if_absent(key, computed);
            }
        }

        Ok(data)
    }
}

impl Drop for StorageEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("storage_dir", &self.config.storage_dir)
            .field("ready", &self.is_ready())
            .field("cached", &self.shared.cache.len())
            .field("pending_writes", &self.queue.pending())
            .finish()
    }
}
