//! Single-slot rendezvous between a producer task and a later consumer.

use std::sync::Mutex;

/// A one-value mailbox.
///
/// The detached generation task `put`s exactly one outcome; some later
/// webhook invocation for the same user `take`s it, which empties the slot.
/// `put` overwrites: if the previous value was never consumed it is
/// displaced, and the caller is told so it can log the stale drop.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Deposit a value, returning `true` when an unconsumed value was
    /// displaced.
    pub fn put(&self, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.replace(value).is_some()
    }

    /// Remove and return the value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }

    pub fn is_empty(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.is_none()
    }
}
