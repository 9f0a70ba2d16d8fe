//! POSIX rlimit helpers for the supervisor process itself.
//!
//! When the child dies by a signal the supervisor re-raises that signal on itself.
//! Signals like `SIGQUIT`/`SIGSEGV`/`SIGABRT` would then dump the supervisor's core,
//! so `RLIMIT_CORE` is dropped to zero first.
use std::io;

/// Sets `RLIMIT_CORE = 0` (soft and hard) for the calling process.
pub fn disable_core_dumps() -> io::Result<()> {
    let rlim = libc::rlimit {
        rlim_cur: 0 as libc::rlim_t,
        rlim_max: 0 as libc::rlim_t,
    };

    let rc = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &rlim) };
    if rc != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Current soft `RLIMIT_CORE` of the calling process.
#[cfg(test)]
fn core_dump_limit() -> io::Result<u64> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0 as libc::rlim_t,
        rlim_max: 0 as libc::rlim_t,
    };

    let rc = unsafe { libc::getrlimit(libc::RLIMIT_CORE, &mut rlim) };
    if rc != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rlim.rlim_cur as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================
