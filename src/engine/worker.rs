//! Persist Worker
//!
//! The single consumer of the write queue. Runs on its own thread for the
//! lifetime of the engine.

use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use crossbeam::select;

use crate::queue::{QueueReceiver, WriteRequest};

use super::stats::EngineStats;
use super::Shared;

/// Messages from the engine to its worker
#[derive(Debug)]
pub(crate) enum Control {
    /// Stop taking requests; ack once paused
    Pause(Sender<()>),
    Resume,
    /// Exit without draining the queue
    Stop,
}

pub(crate) struct PersistWorker {
    requests: QueueReceiver,
    control: Receiver<Control>,
    shared: Arc<Shared>,
}

impl PersistWorker {
    pub(crate) fn new(requests: QueueReceiver, control: Receiver<Control>, shared: Arc<Shared>) -> Self {
        Self {
            requests,
            control,
            shared,
        }
    }

    /// Drain requests in FIFO order until stopped
    ///
    /// While paused only the control channel is watched, so queued requests
    /// stay queued and producers feel the backpressure.
    pub(crate) fn run(self) {
        tracing::debug!("Persist worker started");

        let control = &self.control;
        let requests = self.requests.receiver();
        let mut paused = false;

        loop {
            if paused {
                match control.recv() {
                    Ok(Control::Resume) => {
                        tracing::debug!("Persist worker resumed");
                        paused = false;
                    }
                    Ok(Control::Pause(ack)) => {
                        let _ = ack.send(());
                    }
                    Ok(Control::Stop) | Err(_) => break,
                }
                continue;
            }

            select! {
                recv(control) -> msg => match msg {
                    Ok(Control::Pause(ack)) => {
                        tracing::debug!("Persist worker paused");
                        paused = true;
                        let _ = ack.send(());
                    }
                    Ok(Control::Resume) => {}
                    Ok(Control::Stop) | Err(_) => break,
                },
                recv(requests) -> msg => match msg {
                    Ok(request) => self.persist(request),
                    Err(_) => break,
                },
            }
        }

        tracing::debug!("Persist worker stopped");
    }

    /// Write one request to disk; evict its cache entry on failure
    ///
    /// The request's digest becomes the expected one either way. After a
    /// failed overwrite an older file may remain, and it must not verify.
    fn persist(&self, request: WriteRequest) {
        let WriteRequest { key, data, digest } = request;

        let written = self
            .shared
            .ledger
            .record_around(&key, digest, || self.shared.disk.write_file(&key, &data));

        match written {
            Ok(()) => {
                EngineStats::bump(&self.shared.stats.persisted);
                tracing::trace!(key = %key, bytes = data.len(), "Persisted object");
            }
            Err(e) => {
                EngineStats::bump(&self.shared.stats.persist_failures);
                tracing::error!(key = %key, error = %e, "Failed to write to disk");

                if self.shared.cache.remove_if_same(&key, &data) {
                    tracing::debug!(key = %key, "Evicted unpersisted object from cache");
                }
            }
        }

        self.requests.complete();
    }
}
