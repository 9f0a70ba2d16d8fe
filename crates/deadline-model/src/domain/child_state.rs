use crate::StopSignal;

/// Lifecycle of the single supervised child.
///
/// Ordered: a child only ever moves forward through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChildState {
    /// Launched, no stop requested yet.
    Running,
    /// `SIGTERM` delivered at least once.
    GracefulStopRequested,
    /// `SIGKILL` delivered.
    ForceStopRequested,
    /// Final status collected; the pid is released and must not be signalled.
    Reaped,
}

impl ChildState {
    /// State after a stop request of the given kind was delivered.
    ///
    /// Never moves backwards: a graceful request after a forced one keeps `ForceStopRequested`.
    pub fn after_stop(self, signal: StopSignal) -> Self {
        let requested = match signal {
            StopSignal::Graceful => ChildState::GracefulStopRequested,
            StopSignal::Forced => ChildState::ForceStopRequested,
        };
        self.max(requested)
    }

    #[inline]
    pub fn is_reaped(&self) -> bool {
        matches!(self, ChildState::Reaped)
    }
}
