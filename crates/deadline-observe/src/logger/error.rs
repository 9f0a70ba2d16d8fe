use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}' (expected text, json or journald)")]
    InvalidFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("invalid log filter '{0}'")]
    InvalidLogLevel(String),
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("journald: {0}")]
    Journald(#[source] std::io::Error),
}
