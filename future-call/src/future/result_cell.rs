use crate::error::CallError;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A single-assignment slot with blocking wait semantics.
///
/// The slot accepts exactly one write and any number of reads. Readers that
/// arrive before the write may block on it, with an optional deadline; all
/// of them are released by the one write and observe the same outcome.
pub(crate) struct ResultCell<V> {
    slot: Mutex<Option<V>>,
    ready: Condvar,
}

impl<V> ResultCell<V> {
    pub(crate) fn new() -> Self {
        ResultCell {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Stores `value` if the slot is still empty and releases all waiting
    /// threads. Returns whether the write landed; duplicate completion
    /// signals are ignored.
    ///
    /// A poisoned slot does not stop the write: waiters must still be
    /// released, and they will observe the poisoning themselves.
    pub(crate) fn write(&self, value: V) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let landed = slot.is_none();
        if landed {
            *slot = Some(value);
        }
        drop(slot);
        self.ready.notify_all();
        landed
    }
}

impl<V: Clone> ResultCell<V> {
    /// Returns a copy of the stored outcome without blocking.
    pub(crate) fn peek(&self) -> Result<Option<V>, CallError> {
        match self.slot.lock() {
            Ok(slot) => Ok(slot.clone()),
            Err(_) => Err(CallError::Poisoned),
        }
    }

    /// Blocks the calling thread until the outcome is written or `timeout`
    /// elapses; `None` waits indefinitely.
    ///
    /// Returns `Ok(None)` if the deadline passed first. Safe to call from
    /// any number of threads concurrently.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> Result<Option<V>, CallError> {
        let mut slot = self.slot.lock().map_err(|_| CallError::Poisoned)?;

        match timeout {
            None => {
                while slot.is_none() {
                    slot = self.ready.wait(slot).map_err(|_| CallError::Poisoned)?;
                }
                Ok(slot.clone())
            }
            Some(timeout) => {
                // Re-derive the remaining wait on every wakeup so spurious
                // wakeups cannot shorten (or extend) the deadline.
                let deadline = Instant::now() + timeout;
                while slot.is_none() {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    let (guard, _) = self
                        .ready
                        .wait_timeout(slot, deadline - now)
                        .map_err(|_| CallError::Poisoned)?;
                    slot = guard;
                }
                Ok(slot.clone())
            }
        }
    }
}
