use std::time::Duration;

/// Handle to an armed local tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// In-process one-shot delay scheduler. Only alive while the process
/// is; gaps longer than the process lifetime are covered by the
/// external wake-up instead.
///
/// The service arms a delay; the host that owns the service watches
/// the armed delay and calls [`TimerService::tick`] when it elapses.
///
/// [`TimerService::tick`]: crate::TimerService::tick
pub trait TickScheduler {
    fn register(&mut self, delay: Duration) -> TickHandle;

    fn cancel(&mut self, handle: TickHandle);
}
