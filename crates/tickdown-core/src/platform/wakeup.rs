use chrono::{DateTime, Utc};

use crate::error::ScheduleError;

/// Identifier of a wake-up request held by the platform scheduler.
/// Always non-zero; zero is the persisted sentinel for "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeupHandle(i64);

impl WakeupHandle {
    pub fn new(id: i64) -> Self {
        debug_assert!(id != 0, "zero is the no-wakeup sentinel");
        Self(id)
    }

    pub fn id(self) -> i64 {
        self.0
    }
}

/// The platform's deferred-execution service. A scheduled wake-up can
/// relaunch the process even after full termination, which is what
/// guarantees completion is noticed across power-off or reboot.
pub trait WakeupScheduler {
    /// Request a wake-up at `at`. `payload` is delivered back to the
    /// relaunched process.
    ///
    /// [`ScheduleError::RangeRejected`] means the requested time falls
    /// in a reserved window; every other error is final.
    fn schedule(&mut self, at: DateTime<Utc>, payload: i64) -> Result<WakeupHandle, ScheduleError>;

    fn cancel(&mut self, handle: WakeupHandle) -> Result<(), ScheduleError>;

    /// Whether the request is still pending with the platform.
    fn is_pending(&self, handle: WakeupHandle) -> bool;
}
