mod cli;
mod error;

use clap::{CommandFactory, Parser, error::ErrorKind};
use deadline_core::{Coordinator, EventQueue};
use deadline_exec::{Launcher, mirror};
use deadline_model::ExitOutcome;
use deadline_observe::logger_init;
use tracing::{debug, info};

use crate::{cli::Cli, error::CliError};

fn main() {
    let outcome = match try_main() {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(target: "deadline.cli", error = %e, "supervisor failed");
            e.report();
            std::process::exit(e.exit_code());
        }
    };
    mirror(outcome)
}

fn try_main() -> Result<ExitOutcome, CliError> {
    let cli = Cli::try_parse()?;
    logger_init(&cli.logger_config())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let outcome = runtime.block_on(supervise(&cli))?;
    // Listener tasks and timers go away before the process mirrors the outcome.
    drop(runtime);

    info!(target: "deadline.cli", %outcome, "child finished");
    Ok(outcome)
}

async fn supervise(cli: &Cli) -> Result<ExitOutcome, CliError> {
    let (program, args) = cli.program().ok_or_else(|| {
        Cli::command().error(ErrorKind::MissingRequiredArgument, "COMMAND is required")
    })?;

    let queue = EventQueue::new();
    let child = Launcher::new(queue.sender()).launch(program, args)?;
    info!(
        target: "deadline.cli",
        pid = child.pid(),
        timeout = cli.timeout.seconds(),
        "supervising"
    );

    Ok(Coordinator::new(child, queue, &cli.timeout).run().await?)
}
