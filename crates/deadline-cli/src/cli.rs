use std::ffi::OsString;

use clap::Parser;
use deadline_model::TimeoutConfig;
use deadline_observe::{LoggerConfig, LoggerFormat};

/// Run COMMAND, stopping it if it is still running after SECONDS.
///
/// On expiry the command gets SIGTERM, then SIGKILL 10 seconds later.
/// The exit code, or the terminating signal, of the command is mirrored.
#[derive(Parser, Debug)]
#[command(name = "timeout", version)]
pub struct Cli {
    /// Log filter directive, e.g. `info` or `deadline=debug`.
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,

    /// Log output format: text, json or journald.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    /// Deadline in whole seconds, at least 1.
    #[arg(value_name = "SECONDS", allow_negative_numbers = true)]
    pub timeout: TimeoutConfig,

    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            ..Default::default()
        }
    }

    /// Program and its arguments.
    pub fn program(&self) -> Option<(&OsString, &[OsString])> {
        self.command.split_first()
    }
}
