//! Bounded write queue
//!
//! crossbeam bounded channel plus a pending-write counter. The counter
//! covers everything accepted by `enqueue` until the worker reports the
//! disk attempt done.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use crossbeam::select;
use parking_lot::{Condvar, Mutex};

use crate::error::{Result, VaultError};

use super::{CancelToken, WriteRequest};

/// Producer side, shared by all request threads
#[derive(Debug)]
pub struct WriteQueue {
    sender: Sender<WriteRequest>,
    pending: Arc<Pending>,
    capacity: usize,
}

/// Consumer side, owned by the single persist worker
#[derive(Debug)]
pub struct QueueReceiver {
    receiver: Receiver<WriteRequest>,
    pending: Arc<Pending>,
}

/// Accepted writes whose disk attempt has not finished
#[derive(Debug, Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl WriteQueue {
    /// Create a queue holding at most `capacity` requests
    pub fn bounded(capacity: usize) -> (WriteQueue, QueueReceiver) {
        let (sender, receiver) = channel::bounded(capacity);
        let pending = Arc::new(Pending::default());

        let queue = WriteQueue {
            sender,
            pending: Arc::clone(&pending),
            capacity,
        };
        let consumer = QueueReceiver { receiver, pending };
        (queue, consumer)
    }

    /// Hand a request to the worker
    ///
    /// Blocks while the queue is full. Returns:
    /// - `Ok(())`: accepted; the worker will attempt it
    /// - `Err(Cancelled)`: `cancel` fired first; nothing was queued
    /// - `Err(StorageNotReady)`: the worker is gone
    pub fn enqueue(&self, request: WriteRequest, cancel: &CancelToken) -> Result<()> {
        self.pending.add();

        let request = match self.sender.try_send(request) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(request)) => request,
            Err(TrySendError::Disconnected(_)) => {
                self.pending.done();
                return Err(VaultError::StorageNotReady);
            }
        };

        tracing::debug!(key = %request.key, capacity = self.capacity, "Write queue full, waiting for space");

        let sender = &self.sender;
        let signal = cancel.signal();
        let timer = cancel.timer();

        let outcome = select! {
            send(sender, request) -> res => res.map_err(|_| VaultError::StorageNotReady),
            recv(signal) -> _ => Err(VaultError::Cancelled),
            recv(timer) -> _ => Err(VaultError::Cancelled),
        };

        if outcome.is_err() {
            self.pending.done();
        }
        outcome
    }

    /// Block until every accepted write has been attempted
    ///
    /// Returns false if `timeout` elapsed first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.pending.wait_idle(timeout)
    }

    /// Requests sitting in the channel
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Check if the channel is empty
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Accepted writes not yet attempted (queued + in flight)
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Maximum queued requests
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl QueueReceiver {
    /// The channel end to receive (or `select!`) on
    pub fn receiver(&self) -> &Receiver<WriteRequest> {
        &self.receiver
    }

    /// Report that the disk attempt for one received request has finished
    pub fn complete(&self) {
        self.pending.done();
    }
}

impl Pending {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn get(&self) -> usize {
        *self.count.lock()
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut count = self.count.lock();

        while *count > 0 {
            match deadline {
                Some(at) => {
                    if self.idle.wait_until(&mut count, at).timed_out() {
                        return *count == 0;
                    }
                }
                None => self.idle.wait(&mut count),
            }
        }
        true
    }
}
