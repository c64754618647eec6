//! Platform collaborator seams.
//!
//! The timer service talks to the outside world only through these
//! traits: a wall clock, a durable key-value store, the platform's
//! deferred wake-up service, and a local one-shot tick scheduler.
//! Production implementations live in [`crate::storage`]; tests
//! substitute fakes.

mod tick;
mod wakeup;

pub use tick::{TickHandle, TickScheduler};
pub use wakeup::{WakeupHandle, WakeupScheduler};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Wall-clock time source.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Durable key-value storage for the timer record.
///
/// The service always writes and reads the full fixed-size record;
/// interpreting the bytes (including treating a length mismatch as
/// corruption) is the caller's job.
pub trait StateStore {
    /// Store `bytes` whole under `key`. Returns the byte count written.
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<usize, StorageError>;

    /// Read the full stored bytes under `key`.
    fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    fn exists(&self, key: &str) -> bool;
}

/// Why the process was launched. The caller inspects this at startup
/// to decide between [`resume`](crate::TimerService::resume) and a
/// fresh default view; the timer service itself never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchReason {
    User,
    Wakeup,
    System,
}

/// Receives remaining-time reports from the timer service.
///
/// Registered once at construction. Called at most once per minute
/// while the timer runs, and exactly once more at or after expiry with
/// a non-positive value.
pub trait TickObserver {
    fn on_tick(&mut self, remaining_minutes: i64);
}

impl<F: FnMut(i64)> TickObserver for F {
    fn on_tick(&mut self, remaining_minutes: i64) {
        self(remaining_minutes)
    }
}
