//! The persisted timer record.
//!
//! A fixed-layout, versionless value object holding everything that
//! must survive a full power-down: the duration the user asked for,
//! the absolute deadline, and the handle of the external wake-up
//! scheduled for that deadline. The record is written whole on every
//! state transition and read whole on every process start; any stored
//! byte length other than [`RECORD_LEN`] is corruption.

use chrono::{DateTime, Utc};

use crate::error::RecordError;
use crate::platform::WakeupHandle;

/// Size of the encoded record in bytes: three little-endian i64 fields.
pub const RECORD_LEN: usize = 24;

/// Sentinel meaning "no timer active" / "no wake-up scheduled".
const NONE: i64 = 0;

/// The durable timer state.
///
/// Invariant: `deadline` is the sentinel exactly when `wakeup_handle`
/// is. [`decode`](Self::decode) enforces this; a record that violates
/// it is stale and must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerRecord {
    requested_minutes: i64,
    deadline: i64,
    wakeup_handle: i64,
}

impl TimerRecord {
    /// The duration the user asked for, in minutes. Survives `clear`
    /// so that "restart the same timer" works after a stop.
    pub fn requested_minutes(&self) -> i64 {
        self.requested_minutes
    }

    /// Deadline as a wall-clock timestamp, `None` when idle.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        (self.deadline != NONE).then(|| datetime_from_epoch(self.deadline))
    }

    /// Deadline in epoch seconds; the sentinel 0 when idle.
    pub fn deadline_epoch(&self) -> i64 {
        self.deadline
    }

    /// Handle of the scheduled external wake-up, `None` when idle.
    pub fn wakeup_handle(&self) -> Option<WakeupHandle> {
        (self.wakeup_handle != NONE).then(|| WakeupHandle::new(self.wakeup_handle))
    }

    pub fn is_idle(&self) -> bool {
        self.deadline == NONE
    }

    /// Mark a timer active. `deadline` is epoch seconds.
    pub(crate) fn set_active(&mut self, minutes: i64, deadline: i64, handle: WakeupHandle) {
        self.requested_minutes = minutes;
        self.deadline = deadline;
        self.wakeup_handle = handle.id();
    }

    /// Reset to the sentinels. Keeps `requested_minutes` so the last
    /// duration can be restarted.
    pub(crate) fn clear(&mut self) {
        self.deadline = NONE;
        self.wakeup_handle = NONE;
    }

    /// Encode the full fixed-size layout.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..8].copy_from_slice(&self.requested_minutes.to_le_bytes());
        buf[8..16].copy_from_slice(&self.deadline.to_le_bytes());
        buf[16..24].copy_from_slice(&self.wakeup_handle.to_le_bytes());
        buf
    }

    /// Decode a stored record, rejecting anything that is not exactly
    /// [`RECORD_LEN`] bytes or that violates the activity invariant.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() != RECORD_LEN {
            return Err(RecordError::UnexpectedLength {
                expected: RECORD_LEN,
                found: bytes.len(),
            });
        }
        let record = Self {
            requested_minutes: read_i64(bytes, 0),
            deadline: read_i64(bytes, 8),
            wakeup_handle: read_i64(bytes, 16),
        };
        if (record.deadline == NONE) != (record.wakeup_handle == NONE) {
            return Err(RecordError::InvariantViolated);
        }
        Ok(record)
    }
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    i64::from_le_bytes(buf)
}

/// Epoch seconds to a wall-clock timestamp. Out-of-range values clamp
/// to the chrono minimum.
pub(crate) fn datetime_from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
