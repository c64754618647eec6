//! # Tickdown Core Library
//!
//! Core logic for Tickdown, a single persistent countdown timer built
//! for a host that can be fully powered down mid-countdown. A caller
//! starts a timer of N minutes; the service persists a fixed-layout
//! record on every transition, schedules an external wake-up so
//! completion is noticed even across a reboot, and recomputes the
//! remaining time after a blackout of any length.
//!
//! ## Architecture
//!
//! - **Timer Service**: a wall-clock-based state machine; the host
//!   drives the tick cadence by calling `tick()` when the armed local
//!   delay elapses
//! - **Persisted Timer Record**: a 24-byte value object written whole
//!   to durable storage on every transition
//! - **Platform seams**: clock, key-value store, wake-up scheduler and
//!   tick scheduler traits, with SQLite-backed implementations
//!
//! ## Key Components
//!
//! - [`TimerService`]: the state machine
//! - [`TimerRecord`]: the durable record
//! - [`Database`]: SQLite record slot and wake-up table
//! - [`Config`]: TOML configuration

pub mod error;
pub mod events;
pub mod platform;
pub mod record;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, RecordError, ScheduleError, StorageError};
pub use events::Event;
pub use platform::{
    Clock, LaunchReason, StateStore, SystemClock, TickHandle, TickObserver, TickScheduler,
    WakeupHandle, WakeupScheduler,
};
pub use record::{TimerRecord, RECORD_LEN};
pub use storage::{Config, Database, SqliteStore, SqliteWakeups};
pub use timer::{TimerService, TimerState, Transition};
