use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capture::DEFAULT_RESTART_GRACE;

/// Timing configuration for a session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Pause between releasing and re-acquiring devices on restart
    /// Default: 500ms (rapid re-acquisition fails on common hardware)
    pub restart_grace: Duration,

    /// Interval of the on-air duration ticker
    /// Default: 1 second
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restart_grace: DEFAULT_RESTART_GRACE,
            tick_interval: Duration::from_secs(1),
        }
    }
}
