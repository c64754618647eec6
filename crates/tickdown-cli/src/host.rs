//! Foreground tick driver.

use std::cell::Cell;
use std::time::{Duration, Instant};

use tickdown_core::{TickHandle, TickScheduler};

/// Tick scheduler for the foreground loop. Remembers the armed delay
/// as an absolute instant; the loop sleeps until it elapses, then
/// calls `tick()` on the service.
#[derive(Debug, Default)]
pub struct HostTicker {
    due: Cell<Option<Instant>>,
    seq: Cell<u64>,
}

impl HostTicker {
    /// Time until the armed tick, if one is armed.
    pub fn pending(&self) -> Option<Duration> {
        self.due
            .get()
            .map(|due| due.saturating_duration_since(Instant::now()))
    }
}

impl TickScheduler for HostTicker {
    fn register(&mut self, delay: Duration) -> TickHandle {
        let id = self.seq.get() + 1;
        self.seq.set(id);
        self.due.set(Some(Instant::now() + delay));
        TickHandle::new(id)
    }

    fn cancel(&mut self, _handle: TickHandle) {
        self.due.set(None);
    }
}
