use crate::logger::format::LoggerFormat;

/// How the supervisor reports what it is doing.
///
/// Quiet by default: only escalation problems (`warn`) reach stderr.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `warn` or `deadline=debug`.
    pub level: String,
    pub with_targets: bool,
    /// ANSI colors for the text format.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "warn".to_string(),
            with_targets: true,
            use_color: atty::is(atty::Stream::Stderr),
        }
    }
}
