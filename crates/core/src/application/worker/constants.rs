// Worker constants (no magic values)
use std::time::Duration;

/// Default interval between publish ticks (60 s)
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(60);
