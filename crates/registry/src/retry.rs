use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded retry for dispatch attempts that arrive before the loader has
/// published the registry. The observed behaviour retried every 250ms with
/// no bound; the bound here is explicit configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            delay_ms: 250,
        }
    }
}
