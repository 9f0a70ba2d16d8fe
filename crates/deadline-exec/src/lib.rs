cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod error;
        pub use error::ExecError;

        mod util;
        pub use util::send_signal;

        pub mod utils;

        pub mod launch;
        pub use launch::{ChildProcess, Launcher};

        pub mod outcome;
        pub use outcome::mirror;
    } else {
        compile_error!("deadline-exec relies on POSIX signals and supports unix targets only");
    }
}
