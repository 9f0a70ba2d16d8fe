use deadline_model::{ExitOutcome, Pid, StopSignal};

/// Handle the coordinator uses to act on the supervised child.
///
/// Implemented by the real launched process and by test doubles.
pub trait Supervised {
    /// Recorded process id; `None` only if the child was never launched.
    fn id(&self) -> Option<Pid>;

    /// Deliver a termination request.
    ///
    /// Must be a no-op (`Ok`) when the child already exited.
    fn stop(&mut self, signal: StopSignal) -> std::io::Result<()>;

    /// Collect the final status without blocking.
    ///
    /// Returns `Ok(None)` while the child has not terminated.
    fn reap(&mut self) -> std::io::Result<Option<ExitOutcome>>;
}
