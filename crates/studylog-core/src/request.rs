use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Holds the result of the most recently issued request. Results from
/// requests that were superseded before they finished are dropped.
#[derive(Debug)]
pub struct LatestResult<T> {
    issued: AtomicU64,
    slot: Mutex<Option<(RequestTicket, T)>>,
}

impl<T> Default for LatestResult<T> {
    fn default() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stores `value` if `ticket` is still the newest one issued. The check
    /// runs under the slot lock so a newer result cannot be overwritten.
    pub fn complete(&self, ticket: RequestTicket, value: T) -> bool {
        let Ok(mut slot) = self.slot.lock() else {
            return false;
        };
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!(ticket = ticket.0, "dropping superseded result");
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    pub fn current(&self) -> Option<T> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, value)| value.clone()))
    }
}
