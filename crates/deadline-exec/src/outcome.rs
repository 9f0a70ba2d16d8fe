//! Reproduces the child's termination in the supervisor itself.
//!
//! - `Exited(code)`: the supervisor exits with the same code.
//! - `Signaled(sig)`: core dumps are disabled, then the supervisor raises `sig` on itself,
//!   so a parent sees the very same termination signal rather than a mapped exit code.
//!
//! Must run after the async runtime is shut down: it never returns.

use std::io;

use deadline_model::ExitOutcome;
use tracing::{debug, warn};

use crate::utils::limits::disable_core_dumps;

/// Terminates the current process mirroring `outcome`.
pub fn mirror(outcome: ExitOutcome) -> ! {
    match outcome {
        ExitOutcome::Exited(code) => {
            debug!(target: "deadline.exec.outcome", code, "mirroring exit code");
            std::process::exit(i32::from(code))
        }
        ExitOutcome::Signaled(sig) => {
            debug!(target: "deadline.exec.outcome", signal = sig, "mirroring signal");
            if let Err(e) = disable_core_dumps() {
                warn!(target: "deadline.exec.outcome", error = %e, "setrlimit(RLIMIT_CORE) failed; continuing");
            }
            if let Err(e) = raise_default(sig) {
                warn!(target: "deadline.exec.outcome", signal = sig, error = %e, "raise failed");
            }
            // Only reached for signals whose default action does not terminate.
            std::process::exit(outcome.shell_code())
        }
    }
}

/// Raises `sig` on the calling process with its default disposition.
fn raise_default(sig: libc::c_int) -> io::Result<()> {
    unsafe {
        // SIGKILL/SIGSTOP cannot be reset; their disposition is already the default.
        libc::signal(sig, libc::SIG_DFL);

        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, sig);
        libc::pthread_sigmask(libc::SIG_UNBLOCK, &set, std::ptr::null_mut());

        if libc::raise(sig) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
