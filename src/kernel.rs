//! Composition of the watchers, bus and dispatcher.

use std::sync::Arc;

use tracing::info;

use edittrigger_core_types::{TriggerError, WriteEvent};
use edittrigger_dispatch::{DispatchLoop, DispatchLoopHandle, TriggerDispatcher};
use edittrigger_event_bus::TriggerBus;
use edittrigger_net_watch::NetworkTap;
use edittrigger_registry::{ScriptRunner, ScriptStore, SharedScriptStore};
use edittrigger_route_watch::{AddressProvider, PollHandle, RouteWatcher};

use crate::config::KernelConfig;

/// The assembled trigger kernel.
///
/// Wiring: both watchers publish onto one signal bus; a single dispatch loop
/// consumes it and drives the dispatcher against the shared script registry
/// and the injected runner.
pub struct TriggerKernel {
    bus: Arc<TriggerBus>,
    route_watcher: Arc<RouteWatcher>,
    network_tap: Arc<NetworkTap>,
    store: Arc<SharedScriptStore>,
    dispatch_loop: Option<DispatchLoopHandle>,
    poll: Option<PollHandle>,
}

impl TriggerKernel {
    /// Start the kernel. `initial_href` seeds the route watcher with the
    /// address current at startup; `runner` is the injected script executor.
    pub fn start(
        config: KernelConfig,
        runner: Arc<dyn ScriptRunner>,
        initial_href: &str,
    ) -> Self {
        let bus = TriggerBus::new(config.bus_capacity);
        let store = Arc::new(SharedScriptStore::new());
        let dispatcher = Arc::new(TriggerDispatcher::new(
            Arc::clone(&store) as Arc<dyn ScriptStore>,
            runner,
            config.retry.clone(),
        ));
        let dispatch_loop = DispatchLoop::spawn(Arc::clone(&bus), dispatcher);
        let route_watcher = Arc::new(RouteWatcher::new(
            Arc::clone(&bus),
            config.route.clone(),
            initial_href,
        ));
        let network_tap = Arc::new(NetworkTap::new(Arc::clone(&bus), config.net.clone()));

        info!(initial_href, "trigger kernel started");
        Self {
            bus,
            route_watcher,
            network_tap,
            store,
            dispatch_loop: Some(dispatch_loop),
            poll: None,
        }
    }

    /// Run the safety poll against the host's address provider, for address
    /// changes its notifications miss.
    pub fn attach_address_poll(&mut self, provider: Arc<dyn AddressProvider>) {
        self.poll = Some(self.route_watcher.spawn_poll(provider));
    }

    /// Feed one possibly-changed address (the host's navigation hook).
    pub fn observe_address(&self, href: &str) {
        self.route_watcher.observe(href);
    }

    /// Feed one completed request (the host's network tap hook).
    pub fn record_request(&self, event: WriteEvent) {
        self.network_tap.record(event);
    }

    /// The registry slot the external loader publishes into.
    pub fn store(&self) -> Arc<SharedScriptStore> {
        Arc::clone(&self.store)
    }

    pub fn route_watcher(&self) -> Arc<RouteWatcher> {
        Arc::clone(&self.route_watcher)
    }

    pub fn network_tap(&self) -> Arc<NetworkTap> {
        Arc::clone(&self.network_tap)
    }

    /// The signal bus, for hosts that want to observe trigger traffic.
    pub fn bus(&self) -> Arc<TriggerBus> {
        Arc::clone(&self.bus)
    }

    /// Stop the loops and abort pending debounce timers. An in-flight
    /// dispatch is not interrupted beyond the loop task being awaited here.
    pub async fn shutdown(mut self) -> Result<(), TriggerError> {
        self.route_watcher.abort_pending();
        self.network_tap.abort_pending();
        if let Some(poll) = self.poll.take() {
            poll.shutdown()
                .await
                .map_err(|err| TriggerError::new(err.to_string()))?;
        }
        if let Some(dispatch_loop) = self.dispatch_loop.take() {
            dispatch_loop
                .shutdown()
                .await
                .map_err(|err| TriggerError::new(err.to_string()))?;
        }
        info!("trigger kernel stopped");
        Ok(())
    }
}
