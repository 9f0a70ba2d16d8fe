use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("wait: {0}")]
    Reap(#[source] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Process exit code the supervisor uses for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Reap(_) => 2,
            CoreError::Internal(_) => 3,
        }
    }
}
