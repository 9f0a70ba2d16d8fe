use std::fmt;

/// How the supervised child terminated, and therefore how the supervisor will.
///
/// Produced once, from a single reap, and never revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the child's own status code.
    Exited(u8),
    /// Death by the given signal number.
    Signaled(i32),
}

impl ExitOutcome {
    /// Status an observer would see from a shell (`$?`).
    pub fn shell_code(&self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => i32::from(*code),
            ExitOutcome::Signaled(sig) => 128 + sig,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exited with code {code}"),
            ExitOutcome::Signaled(sig) => write!(f, "killed by signal {sig}"),
        }
    }
}

#[cfg(unix)]
impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match (status.signal(), status.code()) {
            (Some(sig), _) => ExitOutcome::Signaled(sig),
            (None, Some(code)) => ExitOutcome::Exited((code & 0xff) as u8),
            // Stopped/continued statuses never come out of a reap; never report them as success.
            (None, None) => ExitOutcome::Exited(1),
        }
    }
}
