use std::{
    ffi::{OsStr, OsString},
    io,
};

use deadline_core::{Event, EventSender, Supervised};
use deadline_model::{ChildState, ExitOutcome, Pid, StopSignal};
use tokio::{
    signal::unix::{Signal, SignalKind, signal},
    task::JoinHandle,
};
use tracing::{debug, trace};

use crate::{
    error::ExecError,
    util::{cmd_program, send_signal},
};

/// Starts the supervised command and wires its exit notifications to the event queue.
pub struct Launcher {
    events: EventSender,
}

impl Launcher {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Spawns `program` with `args`, resolving it through `PATH`.
    ///
    /// The SIGCHLD subscription is taken before the spawn, so an immediate exit is never missed.
    /// Must be called inside a tokio runtime with the signal driver enabled.
    pub fn launch(
        &self,
        program: impl AsRef<OsStr>,
        args: &[OsString],
    ) -> Result<ChildProcess, ExecError> {
        let program = program.as_ref();
        if program.is_empty() {
            return Err(ExecError::MissingProgram);
        }

        let exits = signal(SignalKind::child()).map_err(ExecError::Signal)?;

        trace!(target: "deadline.exec.launch", ?program, ?args, "spawn");
        let child = cmd_program(program, args)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;

        // A freshly spawned child always has an id; it is only cleared by an await on `wait`.
        let pid = child.id().ok_or_else(|| ExecError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source: io::Error::other("child exited before its id was recorded"),
        })?;
        debug!(target: "deadline.exec.launch", ?program, pid, "child started");

        Ok(ChildProcess {
            child,
            pid,
            state: ChildState::Running,
            listener: watch_exits(exits, self.events.clone()),
        })
    }
}

/// Forwards every SIGCHLD as [`Event::ChildExited`].
///
/// Only records the notification; reaping is left to the coordinator.
fn watch_exits(mut exits: Signal, events: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        while exits.recv().await.is_some() {
            trace!(target: "deadline.exec.launch", "SIGCHLD");
            if !events.notify(Event::ChildExited) {
                break;
            }
        }
    })
}

/// The single child of a supervisor run.
///
/// The pid is recorded once at launch and never reassigned.
pub struct ChildProcess {
    child: tokio::process::Child,
    pid: Pid,
    state: ChildState,
    listener: JoinHandle<()>,
}

impl ChildProcess {
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[cfg(test)]
    fn state(&self) -> ChildState {
        self.state
    }
}

impl Supervised for ChildProcess {
    fn id(&self) -> Option<Pid> {
        Some(self.pid)
    }

    fn stop(&mut self, signal: StopSignal) -> io::Result<()> {
        // Once reaped the pid may belong to someone else.
        if self.state.is_reaped() {
            trace!(target: "deadline.exec.launch", pid = self.pid, %signal, "already reaped; skipping");
            return Ok(());
        }

        send_signal(self.pid, signal)?;
        self.state = self.state.after_stop(signal);
        debug!(target: "deadline.exec.launch", pid = self.pid, %signal, state = ?self.state, "stop delivered");
        Ok(())
    }

    fn reap(&mut self) -> io::Result<Option<ExitOutcome>> {
        if self.state.is_reaped() {
            return Ok(None);
        }

        let Some(status) = self.child.try_wait()? else {
            return Ok(None);
        };

        self.state = ChildState::Reaped;
        self.listener.abort();
        trace!(target: "deadline.exec.launch", pid = self.pid, ?status, "reaped");
        Ok(Some(ExitOutcome::from(status)))
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
