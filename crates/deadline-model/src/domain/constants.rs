use std::time::Duration;

/// Time a child gets between the graceful and the forced stop.
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);
