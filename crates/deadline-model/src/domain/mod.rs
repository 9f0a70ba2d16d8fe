mod constants;
pub use constants::GRACE_PERIOD;

mod timeout;
pub use timeout::{TimeoutConfig, TimeoutParseError};

mod outcome;
pub use outcome::ExitOutcome;

mod child_state;
pub use child_state::ChildState;

mod stop_signal;
pub use stop_signal::StopSignal;

/// Raw OS process identifier of the supervised child.
pub type Pid = u32;
