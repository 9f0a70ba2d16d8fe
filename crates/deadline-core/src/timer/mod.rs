//! Wall-clock alarms feeding the [`EventQueue`](crate::EventQueue).
//!
//! - [`TimerController::arm`]: repeating alarm, first firing after one period.
//! - [`TimerController::once`]: single delayed event (used for the grace period).
//!
//! Each alarm runs as a background task and is cancelled on [`disarm`](TimerController::disarm) or drop.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::queue::{Event, EventSender};

#[derive(Debug)]
pub struct TimerController {
    token: CancellationToken,
}

impl TimerController {
    /// Fires [`Event::TimerFired`] every `period`, starting one `period` from now.
    ///
    /// Must be called inside a tokio runtime.
    pub fn arm(period: Duration, events: EventSender) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();

        tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticks.tick() => {
                        trace!(target: "deadline.core.timer", ?period, "timer fired");
                        if !events.notify(Event::TimerFired) {
                            break;
                        }
                    }
                }
            }
        });

        Self { token }
    }

    /// Delivers `event` once after `delay`, unless disarmed first.
    pub fn once(delay: Duration, events: EventSender, event: Event) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = time::sleep(delay) => {
                    trace!(target: "deadline.core.timer", ?delay, ?event, "one-shot fired");
                    events.notify(event);
                }
            }
        });

        Self { token }
    }

    pub fn disarm(&self) {
        self.token.cancel();
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
