//! # Escalation state machine.
//!
//! ```text
//!            TimerFired               GraceElapsed
//! Running ──────────────► TimedOutGraceful ──────────────► TimedOutForced
//!    │                     │   ▲  TimerFired (re-check)         │
//!    │                     └───┘                                │
//!    └──────────── ChildExited (reaped) ──► Done ◄──────────────┘
//! ```
//!
//! ## Rules
//! - The deadline timer is armed only after the child id is owned by the coordinator.
//! - Escalation never goes backwards; notifications that do not apply to the current phase are no-ops.
//! - The graceful stop reaches the child once; a repeat firing only retries a failed delivery.
//! - Stop delivery failures are logged; the eventual child exit is authoritative.
//! - The outcome comes from exactly one successful reap.

use std::{fmt, time::Duration};

use deadline_model::{ExitOutcome, GRACE_PERIOD, StopSignal, TimeoutConfig};
use tracing::{debug, info, trace, warn};

use crate::{
    error::CoreError,
    queue::{Event, EventQueue},
    supervised::Supervised,
    timer::TimerController,
};

/// Escalation phase of a supervisor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    TimedOutGraceful,
    TimedOutForced,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Running => "running",
            Phase::TimedOutGraceful => "timed-out-graceful",
            Phase::TimedOutForced => "timed-out-forced",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequential consumer of the event queue; owns the child for the whole run.
pub struct Coordinator<C> {
    child: C,
    events: EventQueue,
    period: Duration,
    grace: Duration,
    phase: Phase,
    graceful_delivered: bool,
    grace_timer: Option<TimerController>,
}

impl<C: Supervised> Coordinator<C> {
    pub fn new(child: C, events: EventQueue, timeout: &TimeoutConfig) -> Self {
        Self {
            child,
            events,
            period: timeout.period(),
            grace: GRACE_PERIOD,
            phase: Phase::Running,
            graceful_delivered: false,
            grace_timer: None,
        }
    }

    #[cfg(test)]
    fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Arms the deadline and processes events until the child is reaped.
    pub async fn run(mut self) -> Result<ExitOutcome, CoreError> {
        let deadline = TimerController::arm(self.period, self.events.sender());
        debug!(
            target: "deadline.core.coordinator",
            pid = ?self.child.id(),
            timeout = ?self.period,
            "deadline armed"
        );

        loop {
            let event = self
                .events
                .recv()
                .await
                .ok_or_else(|| CoreError::Internal("event queue closed".into()))?;

            if let Some(outcome) = self.handle(event)? {
                deadline.disarm();
                return Ok(outcome);
            }
        }
    }

    /// Applies one event to the state machine.
    ///
    /// Returns the outcome once the child has been reaped.
    pub fn handle(&mut self, event: Event) -> Result<Option<ExitOutcome>, CoreError> {
        trace!(target: "deadline.core.coordinator", phase = %self.phase, ?event, "event");

        match (self.phase, event) {
            (Phase::Done, _) => Ok(None),
            (_, Event::ChildExited) => self.on_child_exited(),
            (Phase::Running, Event::TimerFired) => {
                self.on_deadline()?;
                Ok(None)
            }
            (Phase::TimedOutGraceful, Event::TimerFired) => {
                if self.graceful_delivered {
                    trace!(target: "deadline.core.coordinator", "deadline fired again; graceful stop already delivered");
                } else {
                    debug!(target: "deadline.core.coordinator", "deadline fired again; retrying graceful stop");
                    self.graceful_delivered = self.deliver(StopSignal::Graceful);
                }
                Ok(None)
            }
            (Phase::TimedOutGraceful, Event::GraceElapsed) => {
                self.on_grace_elapsed();
                Ok(None)
            }
            (phase, event) => {
                trace!(target: "deadline.core.coordinator", %phase, ?event, "no-op");
                Ok(None)
            }
        }
    }

    fn on_deadline(&mut self) -> Result<(), CoreError> {
        let pid = self.child.id().ok_or_else(|| {
            CoreError::Internal("timer fired before the child id was recorded".into())
        })?;

        info!(
            target: "deadline.core.coordinator",
            pid,
            timeout = ?self.period,
            "deadline reached; requesting graceful stop"
        );
        self.graceful_delivered = self.deliver(StopSignal::Graceful);
        self.phase = Phase::TimedOutGraceful;
        self.grace_timer = Some(TimerController::once(
            self.grace,
            self.events.sender(),
            Event::GraceElapsed,
        ));
        Ok(())
    }

    fn on_grace_elapsed(&mut self) {
        warn!(
            target: "deadline.core.coordinator",
            pid = ?self.child.id(),
            grace = ?self.grace,
            "child survived the grace period; forcing stop"
        );
        self.deliver(StopSignal::Forced);
        self.phase = Phase::TimedOutForced;
        self.grace_timer = None;
    }

    fn on_child_exited(&mut self) -> Result<Option<ExitOutcome>, CoreError> {
        let Some(outcome) = self.child.reap().map_err(CoreError::Reap)? else {
            trace!(target: "deadline.core.coordinator", "child state changed without exit");
            return Ok(None);
        };

        debug!(
            target: "deadline.core.coordinator",
            pid = ?self.child.id(),
            from = %self.phase,
            %outcome,
            "child reaped"
        );
        self.phase = Phase::Done;
        self.grace_timer = None;
        Ok(Some(outcome))
    }

    /// Returns whether the stop reached the child.
    fn deliver(&mut self, signal: StopSignal) -> bool {
        if let Err(e) = self.child.stop(signal) {
            warn!(
                target: "deadline.core.coordinator",
                pid = ?self.child.id(),
                %signal,
                error = %e,
                "stop delivery failed; waiting for child exit"
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use deadline_model::Pid;
    use tokio::time::{self, Instant};

    use crate::queue::EventSender;

    type StopLog = Arc<Mutex<Vec<(Duration, StopSignal)>>>;
    type ExitSlot = Arc<Mutex<Option<ExitOutcome>>>;

    /// Scripted child: dies on a chosen signal, records every stop request.
    struct FakeChild {
        pid: Option<Pid>,
        start: Instant,
        stops: StopLog,
        exit: ExitSlot,
        dies_on: Option<StopSignal>,
        refuse_graceful: bool,
        reap_fails: bool,
        events: EventSender,
    }

    impl FakeChild {
        fn new(events: EventSender) -> Self {
            Self {
                pid: Some(4242),
                start: Instant::now(),
                stops: StopLog::default(),
                exit: ExitSlot::default(),
                dies_on: None,
                refuse_graceful: false,
                reap_fails: false,
                events,
            }
        }

        fn dies_on(mut self, signal: StopSignal) -> Self {
            self.dies_on = Some(signal);
            self
        }
    }

    impl Supervised for FakeChild {
        fn id(&self) -> Option<Pid> {
            self.pid
        }

        fn stop(&mut self, signal: StopSignal) -> io::Result<()> {
            self.stops
                .lock()
                .unwrap()
                .push((self.start.elapsed(), signal));

            if self.refuse_graceful && signal == StopSignal::Graceful {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            if self.dies_on == Some(signal) {
                let sig = match signal {
                    StopSignal::Graceful => 15,
                    StopSignal::Forced => 9,
                };
                *self.exit.lock().unwrap() = Some(ExitOutcome::Signaled(sig));
                self.events.notify(Event::ChildExited);
            }
            Ok(())
        }

        fn reap(&mut self) -> io::Result<Option<ExitOutcome>> {
            if self.reap_fails {
                return Err(io::Error::other("ECHILD"));
            }
            Ok(self.exit.lock().unwrap().take())
        }
    }

    fn timeout(secs: u64) -> TimeoutConfig {
        TimeoutConfig::from_secs(secs).unwrap()
    }

    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(50),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exit_before_deadline_is_mirrored() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender());
        let stops = Arc::clone(&child.stops);
        let exit = Arc::clone(&child.exit);
        let tx = queue.sender();

        tokio::spawn(async move {
            time::sleep(Duration::from_secs(2)).await;
            *exit.lock().unwrap() = Some(ExitOutcome::Exited(7));
            tx.notify(Event::ChildExited);
        });

        let start = Instant::now();
        let outcome = Coordinator::new(child, queue, &timeout(5)).run().await.unwrap();

        assert_eq!(outcome, ExitOutcome::Exited(7));
        assert_near(start.elapsed(), Duration::from_secs(2));
        assert!(stops.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_stop_at_deadline_without_force() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender()).dies_on(StopSignal::Graceful);
        let stops = Arc::clone(&child.stops);

        let start = Instant::now();
        let outcome = Coordinator::new(child, queue, &timeout(2)).run().await.unwrap();

        assert_eq!(outcome, ExitOutcome::Signaled(15));
        assert_near(start.elapsed(), Duration::from_secs(2));

        let stops = stops.lock().unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].1, StopSignal::Graceful);
        assert_near(stops[0].0, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_child_is_forced_after_grace() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender()).dies_on(StopSignal::Forced);
        let stops = Arc::clone(&child.stops);

        let start = Instant::now();
        let outcome = Coordinator::new(child, queue, &timeout(1)).run().await.unwrap();

        assert_eq!(outcome, ExitOutcome::Signaled(9));
        assert_near(start.elapsed(), Duration::from_secs(11));

        let stops = stops.lock().unwrap();
        let (first_at, first) = stops[0];
        assert_eq!(first, StopSignal::Graceful);
        assert_near(first_at, Duration::from_secs(1));

        let (last_at, last) = *stops.last().unwrap();
        assert_eq!(last, StopSignal::Forced);
        assert_near(last_at, Duration::from_secs(11));

        let forced = stops.iter().filter(|(_, s)| *s == StopSignal::Forced).count();
        assert_eq!(forced, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_stop_is_not_repeated_while_waiting_for_grace() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender()).dies_on(StopSignal::Forced);
        let stops = Arc::clone(&child.stops);

        // Ten deadline periods fit into the grace window.
        Coordinator::new(child, queue, &timeout(1)).run().await.unwrap();

        let stops = stops.lock().unwrap();
        let graceful: Vec<_> = stops
            .iter()
            .filter(|(_, s)| *s == StopSignal::Graceful)
            .map(|(at, _)| at.as_secs())
            .collect();
        assert_eq!(graceful, [1]);
    }

    #[tokio::test(start_paused = true)]
    async fn firings_after_force_do_not_restart_escalation() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender());
        let stops = Arc::clone(&child.stops);
        let exit = Arc::clone(&child.exit);
        let tx = queue.sender();

        // Forced stop at 11s is "lost"; the child only goes away at 15s.
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(15_500)).await;
            *exit.lock().unwrap() = Some(ExitOutcome::Signaled(9));
            tx.notify(Event::ChildExited);
        });

        let outcome = Coordinator::new(child, queue, &timeout(1)).run().await.unwrap();
        assert_eq!(outcome, ExitOutcome::Signaled(9));

        let stops = stops.lock().unwrap();
        let forced: Vec<_> = stops
            .iter()
            .filter(|(_, s)| *s == StopSignal::Forced)
            .collect();
        assert_eq!(forced.len(), 1);
        assert!(stops.iter().all(|(at, _)| *at < Duration::from_secs(12)));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_grace_period() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender()).dies_on(StopSignal::Forced);

        let start = Instant::now();
        let outcome = Coordinator::new(child, queue, &timeout(3))
            .with_grace(Duration::from_secs(2))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome, ExitOutcome::Signaled(9));
        assert_near(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_graceful_delivery_is_not_fatal() {
        let queue = EventQueue::new();
        let mut child = FakeChild::new(queue.sender()).dies_on(StopSignal::Forced);
        child.refuse_graceful = true;
        let stops = Arc::clone(&child.stops);

        let outcome = Coordinator::new(child, queue, &timeout(1)).run().await.unwrap();
        assert_eq!(outcome, ExitOutcome::Signaled(9));

        // Every period retries the refused graceful stop until force takes over.
        let stops = stops.lock().unwrap();
        let graceful = stops.iter().filter(|(_, s)| *s == StopSignal::Graceful).count();
        assert!(graceful > 1, "graceful attempts: {graceful}");
        assert_eq!(stops.last().map(|(_, s)| *s), Some(StopSignal::Forced));
    }

    #[tokio::test]
    async fn timer_without_child_id_is_internal_error() {
        let queue = EventQueue::new();
        let mut child = FakeChild::new(queue.sender());
        child.pid = None;
        let stops = Arc::clone(&child.stops);

        let mut coordinator = Coordinator::new(child, queue, &timeout(1));
        let err = coordinator.handle(Event::TimerFired).unwrap_err();

        assert!(matches!(err, CoreError::Internal(_)));
        assert_eq!(err.exit_code(), 3);
        assert!(stops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spurious_child_notification_keeps_phase() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender());
        let mut coordinator = Coordinator::new(child, queue, &timeout(1));

        assert_eq!(coordinator.handle(Event::ChildExited).unwrap(), None);
        assert_eq!(coordinator.phase(), Phase::Running);

        coordinator.handle(Event::TimerFired).unwrap();
        assert_eq!(coordinator.handle(Event::ChildExited).unwrap(), None);
        assert_eq!(coordinator.phase(), Phase::TimedOutGraceful);
    }

    #[tokio::test]
    async fn phases_never_regress() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender());
        let mut coordinator = Coordinator::new(child, queue, &timeout(1));

        coordinator.handle(Event::GraceElapsed).unwrap();
        assert_eq!(coordinator.phase(), Phase::Running);

        coordinator.handle(Event::TimerFired).unwrap();
        coordinator.handle(Event::TimerFired).unwrap();
        assert_eq!(coordinator.phase(), Phase::TimedOutGraceful);

        coordinator.handle(Event::GraceElapsed).unwrap();
        assert_eq!(coordinator.phase(), Phase::TimedOutForced);

        coordinator.handle(Event::TimerFired).unwrap();
        coordinator.handle(Event::GraceElapsed).unwrap();
        assert_eq!(coordinator.phase(), Phase::TimedOutForced);
    }

    #[tokio::test]
    async fn reap_failure_is_fatal() {
        let queue = EventQueue::new();
        let mut child = FakeChild::new(queue.sender());
        child.reap_fails = true;

        let mut coordinator = Coordinator::new(child, queue, &timeout(1));
        let err = coordinator.handle(Event::ChildExited).unwrap_err();

        assert!(matches!(err, CoreError::Reap(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn outcome_is_produced_once() {
        let queue = EventQueue::new();
        let child = FakeChild::new(queue.sender());
        let exit = Arc::clone(&child.exit);
        let mut coordinator = Coordinator::new(child, queue, &timeout(1));

        *exit.lock().unwrap() = Some(ExitOutcome::Exited(0));
        assert_eq!(
            coordinator.handle(Event::ChildExited).unwrap(),
            Some(ExitOutcome::Exited(0))
        );
        assert_eq!(coordinator.phase(), Phase::Done);

        *exit.lock().unwrap() = Some(ExitOutcome::Exited(1));
        assert_eq!(coordinator.handle(Event::ChildExited).unwrap(), None);
    }
}
