use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("child notifications unavailable: {0}")]
    Signal(#[source] std::io::Error),
}

impl ExecError {
    /// Process exit code the supervisor uses for this failure.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
