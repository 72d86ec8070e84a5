//! Configuration for the network write watcher.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetWatchConfig {
    /// Quiet window per endpoint family; a burst of writes inside the window
    /// collapses into one trigger.
    pub debounce_ms: u64,
}

impl Default for NetWatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 400 }
    }
}
