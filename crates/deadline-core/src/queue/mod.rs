//! # Ordered event queue between notification sources and the coordinator.
//!
//! ```text
//! Sources (many):                    Consumer (one):
//!   repeating timer ──┐
//!   grace timer     ──┼────► EventQueue ────► Coordinator
//!   SIGCHLD listener──┘   (mpsc, FIFO)
//! ```
//!
//! Sources never block and never touch the child; they only describe what happened.
//! The coordinator processes events strictly in arrival order.

use tokio::sync::mpsc;

/// Notification delivered to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The repeating deadline timer fired.
    TimerFired,
    /// The child changed state (usually: terminated).
    ChildExited,
    /// The grace period after a graceful stop ran out.
    GraceElapsed,
}

/// Single-consumer FIFO of [`Event`]s.
///
/// Keeps its own sender so `recv` only completes on an actual event.
#[derive(Debug)]
pub struct EventQueue {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Creates a producer handle for a notification source.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Suspends until the next event arrives.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Returns an already queued event, if any.
    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable producer side of the [`EventQueue`].
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Enqueues an event; never blocks.
    ///
    /// Returns `false` once the queue is gone, so sources can stop.
    pub fn notify(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}
