//! Cancellation for blocking enqueues
//!
//! A token fires when its deadline passes or when its handle is cancelled
//! (or dropped). Clones share the same signal.

use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

/// Caller-side cancel signal, checked while Save waits for queue space
#[derive(Debug, Clone)]
pub struct CancelToken {
    deadline: Option<Instant>,
    /// Disconnects when the paired handle cancels or is dropped
    signal: Receiver<()>,
}

/// Fires every clone of its token
#[derive(Debug)]
pub struct CancelHandle {
    sender: Mutex<Option<Sender<()>>>,
}

impl CancelToken {
    /// A token that never fires
    pub fn none() -> Self {
        Self {
            deadline: None,
            signal: channel::never(),
        }
    }

    /// Fires once `timeout` has elapsed from now
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(at) => Self::with_deadline(at),
            None => Self::none(),
        }
    }

    /// Fires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            signal: channel::never(),
        }
    }

    /// An explicitly cancellable token and its handle
    pub fn cancellable() -> (CancelHandle, CancelToken) {
        let (sender, signal) = channel::bounded(0);
        let handle = CancelHandle {
            sender: Mutex::new(Some(sender)),
        };
        let token = CancelToken {
            deadline: None,
            signal,
        };
        (handle, token)
    }

    /// Add (or tighten) a deadline on this token
    pub fn and_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has passed or the handle has fired
    pub fn is_cancelled(&self) -> bool {
        if self.deadline.is_some_and(|at| Instant::now() >= at) {
            return true;
        }
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Receiver that becomes ready when the handle fires
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Receiver that becomes ready at the deadline
    pub(crate) fn timer(&self) -> Receiver<Instant> {
        match self.deadline {
            Some(at) => channel::at(at),
            None => channel::never(),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::none()
    }
}

impl CancelHandle {
    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.sender.lock().take();
    }

    /// True once `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.sender.lock().is_none()
    }
}
