use std::fmt;

/// Kind of termination request sent to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Cooperative request; the child may handle or ignore it (`SIGTERM`).
    Graceful,
    /// Unconditional kill (`SIGKILL`).
    Forced,
}

impl StopSignal {
    /// Conventional signal name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            StopSignal::Graceful => "SIGTERM",
            StopSignal::Forced => "SIGKILL",
        }
    }
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
