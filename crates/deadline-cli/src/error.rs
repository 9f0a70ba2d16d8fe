use thiserror::Error;

use deadline_core::CoreError;
use deadline_exec::ExecError;
use deadline_observe::LoggerError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("logger: {0}")]
    Logger(#[from] LoggerError),
    #[error("runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CliError {
    /// Exit code of the supervisor when it fails on its own account.
    pub fn exit_code(&self) -> i32 {
        match self {
            // `--help` and `--version` surface as clap errors too.
            CliError::Usage(e) if !e.use_stderr() => 0,
            CliError::Usage(_) | CliError::Logger(_) => 1,
            CliError::Runtime(_) => 2,
            CliError::Exec(e) => e.exit_code(),
            CliError::Core(e) => e.exit_code(),
        }
    }

    /// Writes the diagnostic for this failure.
    pub fn report(&self) {
        match self {
            CliError::Usage(e) => {
                let _ = e.print();
            }
            other => eprintln!("timeout: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn exit_codes_follow_the_taxonomy() {
        let usage = CliError::from(Cli::try_parse_from(["timeout", "0", "true"]).unwrap_err());
        assert_eq!(usage.exit_code(), 1);

        let help = CliError::from(Cli::try_parse_from(["timeout", "--help"]).unwrap_err());
        assert_eq!(help.exit_code(), 0);

        let logger = CliError::from(LoggerError::InvalidLogLevel("x=y=z".into()));
        assert_eq!(logger.exit_code(), 1);

        let launch = CliError::from(ExecError::Spawn {
            program: "/no/such/binary".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(launch.exit_code(), 2);
        assert!(launch.to_string().starts_with("/no/such/binary: "));

        let reap = CliError::from(CoreError::Reap(std::io::Error::other("ECHILD")));
        assert_eq!(reap.exit_code(), 2);

        let internal = CliError::from(CoreError::Internal("timer fired early".into()));
        assert_eq!(internal.exit_code(), 3);
    }
}
