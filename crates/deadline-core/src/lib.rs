pub mod error;
pub use error::CoreError;

pub mod queue;
pub use queue::{Event, EventQueue, EventSender};

pub mod timer;
pub use timer::TimerController;

pub mod supervised;
pub use supervised::Supervised;

pub mod coordinator;
pub use coordinator::{Coordinator, Phase};
