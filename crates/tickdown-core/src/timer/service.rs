//! The timer service state machine.
//!
//! Owns the only mutable timer state in the process: the persisted
//! record plus the armed local tick. Every transition writes the
//! record back to durable storage before returning, because the
//! process may be killed at any point after.
//!
//! Two independently scheduled deferred mechanisms hang off a running
//! timer: the local tick (dies with the process) and the external
//! wake-up (survives it). The service holds both handles and every
//! transition out of Running cancels both.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, ScheduleError, StorageError};
use crate::events::Event;
use crate::platform::{
    Clock, StateStore, TickHandle, TickObserver, TickScheduler, WakeupScheduler,
};
use crate::record::{datetime_from_epoch, TimerRecord};

/// Default backward-retry budget for wake-up scheduling.
pub const DEFAULT_RETRY_CAP: u32 = 10;

/// Derived view of the persisted record against the current time.
/// Never stored; `Running` versus `ExpiredPending` is decided by the
/// clock at the moment of asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Sentinel record, nothing running.
    Idle,
    /// Deadline in the future, local and external timers armed.
    Running,
    /// Deadline in the past, completion not yet reported.
    ExpiredPending,
}

/// Outcome of a transition that also writes the durable record.
///
/// The in-memory transition stands even when the write fails; the
/// failure is reported here instead of rolling back, so the caller can
/// warn without losing the running timer.
#[derive(Debug)]
pub struct Transition {
    pub event: Event,
    pub persist_error: Option<StorageError>,
}

/// The single-timer countdown service.
pub struct TimerService<S, W, T, C> {
    record: TimerRecord,
    key: String,
    store: S,
    wakeups: W,
    ticks: T,
    clock: C,
    local_tick: Option<TickHandle>,
    observer: Box<dyn TickObserver>,
    retry_cap: u32,
}

impl<S, W, T, C> TimerService<S, W, T, C>
where
    S: StateStore,
    W: WakeupScheduler,
    T: TickScheduler,
    C: Clock,
{
    /// Load the record stored under `key`, or initialize a fresh
    /// sentinel record when none exists or the stored bytes cannot be
    /// trusted. Registers the tick observer. Starts nothing; the
    /// caller decides between [`resume`](Self::resume) and
    /// [`start`](Self::start).
    pub fn load_or_new(
        store: S,
        wakeups: W,
        ticks: T,
        clock: C,
        key: impl Into<String>,
        observer: Box<dyn TickObserver>,
    ) -> Self {
        let key = key.into();
        let record = if store.exists(&key) {
            match store.read(&key).map_err(CoreError::from).and_then(|bytes| {
                TimerRecord::decode(&bytes).map_err(CoreError::from)
            }) {
                Ok(record) => record,
                Err(err) => {
                    tracing::error!("invalid record under '{key}': {err}; resetting");
                    TimerRecord::default()
                }
            }
        } else {
            tracing::info!("no record under '{key}'; starting fresh");
            TimerRecord::default()
        };

        Self {
            record,
            key,
            store,
            wakeups,
            ticks,
            clock,
            local_tick: None,
            observer,
            retry_cap: DEFAULT_RETRY_CAP,
        }
    }

    /// Override the backward-retry budget for wake-up scheduling.
    pub fn with_retry_cap(mut self, cap: u32) -> Self {
        self.retry_cap = cap.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.record.is_idle() {
            TimerState::Idle
        } else if self.record.deadline_epoch() >= self.clock.now().timestamp() {
            TimerState::Running
        } else {
            TimerState::ExpiredPending
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.record.deadline()
    }

    pub fn requested_minutes(&self) -> i64 {
        self.record.requested_minutes()
    }

    pub fn record(&self) -> &TimerRecord {
        &self.record
    }

    /// The local tick scheduler, for hosts that drive the cadence.
    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.clock.now();
        let remaining_minutes = match self.record.deadline_epoch() {
            0 => 0,
            deadline => (deadline - now.timestamp()) / 60,
        };
        Event::StateSnapshot {
            state: self.state(),
            requested_minutes: self.record.requested_minutes(),
            deadline: self.record.deadline(),
            remaining_minutes,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown of `minutes`.
    ///
    /// `minutes` must be strictly positive; input validation is the
    /// caller's job and zero-as-restart is a caller concept.
    ///
    /// Schedules the external wake-up first, moving the deadline one
    /// minute earlier for each reserved-window rejection until the
    /// retry budget runs out. Then persists the record and arms the
    /// local tick to fire right away.
    pub fn start(&mut self, minutes: u32) -> Result<Transition, CoreError> {
        assert!(minutes > 0, "duration must be strictly positive");

        let now = self.clock.now();
        let mut deadline = now.timestamp() + i64::from(minutes) * 60;

        let mut attempts = 0u32;
        let handle = loop {
            match self.wakeups.schedule(datetime_from_epoch(deadline), 0) {
                Ok(handle) => break handle,
                Err(ScheduleError::RangeRejected) => {
                    attempts += 1;
                    if attempts >= self.retry_cap {
                        return Err(ScheduleError::RetryBudgetExhausted { attempts }.into());
                    }
                    tracing::warn!(
                        "wake-up unavailable at {}; trying 1 minute earlier",
                        datetime_from_epoch(deadline)
                    );
                    deadline -= 60;
                }
                Err(err) => return Err(err.into()),
            }
        };

        self.record.set_active(i64::from(minutes), deadline, handle);
        let persist_error = self.persist();

        // First report lands immediately; the tick re-arms from there.
        self.arm_tick(Duration::from_millis(1));

        Ok(Transition {
            event: Event::TimerStarted {
                requested_minutes: i64::from(minutes),
                deadline: datetime_from_epoch(deadline),
                at: now,
            },
            persist_error,
        })
    }

    /// Stop the timer: cancel the local tick, cancel the external
    /// wake-up if still pending, reset the record to the sentinels and
    /// persist it.
    ///
    /// Idempotent; stopping an idle timer is a no-op apart from the
    /// persistence write.
    pub fn stop(&mut self) -> Transition {
        let now = self.clock.now();

        if let Some(handle) = self.local_tick.take() {
            self.ticks.cancel(handle);
        }

        if let Some(handle) = self.record.wakeup_handle() {
            if self.wakeups.is_pending(handle) {
                if let Err(err) = self.wakeups.cancel(handle) {
                    // A dangling wake-up relaunches the process later.
                    tracing::error!("failed to cancel wake-up {}: {err}", handle.id());
                }
            }
        }

        self.record.clear();
        let persist_error = self.persist();

        Transition {
            event: Event::TimerStopped { at: now },
            persist_error,
        }
    }

    /// Advance the cadence. The host calls this when the armed local
    /// delay elapses.
    ///
    /// Reports the remaining whole minutes to the observer, then
    /// re-arms for `min(remaining, 60)` seconds so the final tick
    /// lands on the deadline instead of overshooting. At or past the
    /// deadline it reports once more (non-positive) and stops; the
    /// record is left for `start`/`stop` to mutate.
    pub fn tick(&mut self) -> Event {
        let now = self.clock.now();
        self.local_tick = None;

        let remaining = self.record.deadline_epoch() - now.timestamp();
        let remaining_minutes = remaining / 60;

        self.observer.on_tick(remaining_minutes);

        if remaining <= 0 {
            tracing::info!("timer ended, not renewing ({}s past deadline)", -remaining);
            return Event::TimerCompleted {
                deadline: datetime_from_epoch(self.record.deadline_epoch()),
                at: now,
            };
        }

        let wait = remaining.min(60) as u64;
        self.arm_tick(Duration::from_secs(wait));

        Event::Tick {
            remaining_minutes,
            at: now,
        }
    }

    /// The recovery decision, made once at process start.
    ///
    /// Returns `false` when the persisted deadline already passed
    /// while the process was not running (the idle sentinel included);
    /// the caller then reports completion exactly once on its own,
    /// without re-entering the cadence. Returns `true` after arming
    /// the local tick for a deadline still in the future.
    pub fn resume(&mut self) -> bool {
        if self.record.deadline_epoch() < self.clock.now().timestamp() {
            return false;
        }
        // The tick recovers the cadence from here.
        self.arm_tick(Duration::from_millis(1));
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&mut self) -> Option<StorageError> {
        match self.store.write(&self.key, &self.record.encode()) {
            Ok(_) => None,
            Err(err) => {
                tracing::error!("failed to save record under '{}': {err}", self.key);
                Some(err)
            }
        }
    }

    fn arm_tick(&mut self, delay: Duration) {
        if let Some(handle) = self.local_tick.take() {
            self.ticks.cancel(handle);
        }
        self.local_tick = Some(self.ticks.register(delay));
    }
}
