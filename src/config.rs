//! Kernel configuration.

use serde::{Deserialize, Serialize};

use edittrigger_net_watch::NetWatchConfig;
use edittrigger_registry::RetryPolicy;
use edittrigger_route_watch::RouteWatchConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Capacity of the trigger-signal bus.
    pub bus_capacity: usize,
    pub route: RouteWatchConfig,
    pub net: NetWatchConfig,
    pub retry: RetryPolicy,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            bus_capacity: 32,
            route: RouteWatchConfig::default(),
            net: NetWatchConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}
