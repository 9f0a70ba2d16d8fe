use std::{
    ffi::{OsStr, OsString},
    io,
    process::Stdio,
};

use deadline_model::{Pid, StopSignal};
use tokio::process::Command;
use tracing::trace;

/// Builds the child command; standard streams, environment and cwd are inherited.
pub fn cmd_program(program: &OsStr, args: &[OsString]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

#[inline]
pub fn raw_signal(signal: StopSignal) -> libc::c_int {
    match signal {
        StopSignal::Graceful => libc::SIGTERM,
        StopSignal::Forced => libc::SIGKILL,
    }
}

/// Sends `signal` to `pid`.
///
/// A target that no longer exists (`ESRCH`) is not an error.
pub fn send_signal(pid: Pid, signal: StopSignal) -> io::Result<()> {
    let target = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("pid {pid} out of range")))?;

    let rc = unsafe { libc::kill(target, raw_signal(signal)) };
    if rc == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        trace!(target: "deadline.exec.signal", pid, %signal, "target already gone");
        return Ok(());
    }
    Err(err)
}
