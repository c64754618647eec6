use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every externally visible timer transition produces an Event.
/// The caller renders these; the core never depends on them being
/// consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        requested_minutes: i64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Periodic remaining-time report while running.
    Tick {
        remaining_minutes: i64,
        at: DateTime<Utc>,
    },
    /// The deadline passed; the local cadence stops here.
    TimerCompleted {
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A persisted timer was picked up again after a process restart.
    TimerResumed {
        remaining_minutes: i64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        requested_minutes: i64,
        deadline: Option<DateTime<Utc>>,
        remaining_minutes: i64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_by_type() {
        let event = Event::TimerStopped { at: Utc::now() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TimerStopped\""));
    }
}
