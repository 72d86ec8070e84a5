//! Configuration for the URL transition watcher.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteWatchConfig {
    /// Settle window after an address change; only the final state of a
    /// navigation burst is evaluated.
    pub debounce_ms: u64,
    /// Safety poll cadence for address changes the host's hooks miss.
    pub poll_interval_ms: u64,
}

impl Default for RouteWatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            poll_interval_ms: 800,
        }
    }
}
