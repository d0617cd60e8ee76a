//! Per-pin reply slots shared between the receive thread and callers.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::{DhtReading, Pin};

/// One slot per pin: `None` while no reply is waiting, `Some` once the
/// handler stored one. A single coarse lock covers every pin.
#[derive(Debug, Default)]
pub struct ReplyTable {
    slots: Mutex<HashMap<Pin, Option<DhtReading>>>,
    ready: Condvar,
}

impl ReplyTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Pin, Option<DhtReading>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fill the slot for `pin`, overwriting whatever was there, and wake
    /// any waiter.
    pub fn store(&self, pin: Pin, reading: DhtReading) {
        let previous = self.slots().insert(pin, Some(reading));
        if let Some(Some(stale)) = previous {
            log::debug!("Pin {pin}: unconsumed reading {stale:?} overwritten");
        }
        self.ready.notify_all();
    }

    /// Reset the slot for `pin` to unset.
    pub fn clear(&self, pin: Pin) {
        if let Some(Some(stale)) = self.slots().insert(pin, None) {
            log::debug!("Pin {pin}: discarded stale reading {stale:?}");
        }
    }

    /// Take the reading for `pin` if one is waiting, leaving the slot unset.
    pub fn take(&self, pin: Pin) -> Option<DhtReading> {
        self.slots().get_mut(&pin).and_then(Option::take)
    }

    /// True if a reading for `pin` is waiting to be consumed
    pub fn is_set(&self, pin: Pin) -> bool {
        matches!(self.slots().get(&pin), Some(Some(_)))
    }

    /// Block until the slot for `pin` is set or `timeout` elapses.
    ///
    /// Wakes on every `store` and re-checks at least every `poll` so a
    /// missed notification costs at most one poll interval. Returns the
    /// reading (slot reset to unset) or `None` on timeout.
    pub fn wait_take(&self, pin: Pin, timeout: Duration, poll: Duration) -> Option<DhtReading> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.slots();

        loop {
            if let Some(reading) = slots.get_mut(&pin).and_then(Option::take) {
                return Some(reading);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let wait = (deadline - now).min(poll);
            slots = self
                .ready
                .wait_timeout(slots, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
