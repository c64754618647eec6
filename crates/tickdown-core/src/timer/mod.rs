mod service;

pub use service::{TimerService, TimerState, Transition, DEFAULT_RETRY_CAP};
