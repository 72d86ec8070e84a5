use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use edittrigger_core_types::{RouteMode, TabToken, TriggerContext};
use edittrigger_event_bus::{TriggerBus, TriggerSignal};

use crate::config::RouteWatchConfig;
use crate::route::route_state;

/// Host capability for the safety poll: sample the current address.
pub trait AddressProvider: Send + Sync {
    fn current_href(&self) -> String;
}

struct Snapshot {
    href: String,
    tab: Option<TabToken>,
    mode: RouteMode,
}

/// Detects the edit→view flip on a stable tab.
///
/// The host calls [`observe`](RouteWatcher::observe) from whatever
/// address-change notifications it has; [`spawn_poll`](RouteWatcher::spawn_poll)
/// covers changes those notifications miss.
pub struct RouteWatcher {
    state: Mutex<Snapshot>,
    pending: Mutex<Option<JoinHandle<()>>>,
    bus: Arc<TriggerBus>,
    config: RouteWatchConfig,
}

impl RouteWatcher {
    /// Seed the watcher from the address current at initialization.
    pub fn new(
        bus: Arc<TriggerBus>,
        config: RouteWatchConfig,
        initial_href: &str,
    ) -> Self {
        let seed = route_state(initial_href);
        Self {
            state: Mutex::new(Snapshot {
                href: initial_href.to_string(),
                tab: seed.tab,
                mode: seed.mode,
            }),
            pending: Mutex::new(None),
            bus,
            config,
        }
    }

    /// Feed one possibly-changed address. Identical hrefs are a no-op; a
    /// changed href schedules a debounced evaluation of the transition,
    /// replacing any evaluation still pending from an earlier change.
    pub fn observe(&self, href: &str) {
        let (prev_tab, prev_mode, new_tab, new_mode) = {
            let mut state = self.state.lock();
            if state.href == href {
                return;
            }
            let sampled = route_state(href);
            let prev_tab = state.tab.clone();
            let prev_mode = state.mode.clone();
            state.href = href.to_string();
            state.tab = sampled.tab.clone();
            state.mode = sampled.mode.clone();
            (prev_tab, prev_mode, sampled.tab, sampled.mode)
        };

        // Fire only on edit -> view with the tab unchanged and known.
        let fire = prev_mode == RouteMode::Edit
            && new_mode == RouteMode::View
            && prev_tab.is_some()
            && prev_tab == new_tab;
        trace!(href, fire, "route change observed");

        let bus = Arc::clone(&self.bus);
        let delay = Duration::from_millis(self.config.debounce_ms);
        let href = href.to_string();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            if !fire {
                return;
            }
            // new_tab equals prev_tab here and both are present.
            let Some(tab) = new_tab else { return };
            debug!(tab = %tab, "edit→view transition settled, triggering");
            let context = TriggerContext::url_flip(tab, href);
            if let Err(err) = bus.publish(TriggerSignal::new(context)) {
                debug!(error = %err, "trigger signal had no consumers");
            }
        });
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Abort a pending transition evaluation (kernel shutdown).
    pub fn abort_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Spawn the fixed-interval safety poll against the host's address
    /// provider. Returns a handle for lifecycle control.
    pub fn spawn_poll(self: &Arc<Self>, provider: Arc<dyn AddressProvider>) -> PollHandle {
        let watcher = Arc::clone(self);
        let cancel = CancellationToken::new();
        let loop_token = cancel.clone();
        let tick = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let task = tokio::spawn(async move {
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        watcher.observe(&provider.current_href());
                    }
                }
            }
        });
        PollHandle {
            cancel,
            task: Some(task),
        }
    }
}

impl Drop for RouteWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().take() {
            task.abort();
        }
    }
}

/// Handle for the safety poll loop.
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Gracefully stop the poll loop and await its completion.
    pub async fn shutdown(mut self) -> Result<(), tokio::task::JoinError> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(_) => Ok(()),
                Err(err) if err.is_cancelled() => Ok(()),
                Err(err) => Err(err),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edittrigger_core_types::TriggerReason;
    use edittrigger_event_bus::TriggerReceiver;
    use tokio::time::timeout;

    fn watcher_with_window(
        debounce_ms: u64,
        initial: &str,
    ) -> (Arc<RouteWatcher>, TriggerReceiver) {
        let bus = TriggerBus::new(16);
        let rx = bus.subscribe();
        let config = RouteWatchConfig {
            debounce_ms,
            poll_interval_ms: 20,
        };
        (Arc::new(RouteWatcher::new(bus, config, initial)), rx)
    }

    #[tokio::test]
    async fn edit_to_view_on_same_tab_fires_once() {
        let (watcher, mut rx) =
            watcher_with_window(20, "https://plm.example/app/bom/7?mode=edit");
        watcher.observe("https://plm.example/app/bom/7?mode=view");

        let signal = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("trigger")
            .expect("signal");
        assert_eq!(signal.context.tab, TabToken::Bom);
        assert_eq!(signal.context.reason, TriggerReason::UrlEditToView);
        assert_eq!(
            signal.context.url.as_deref(),
            Some("https://plm.example/app/bom/7?mode=view")
        );

        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn tab_change_during_flip_does_not_fire() {
        let (watcher, mut rx) =
            watcher_with_window(20, "https://plm.example/app/bom/7?mode=edit");
        watcher.observe("https://plm.example/app/grid?mode=view");

        assert!(timeout(Duration::from_millis(120), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn view_to_edit_does_not_fire() {
        let (watcher, mut rx) =
            watcher_with_window(20, "https://plm.example/app/bom/7?mode=view");
        watcher.observe("https://plm.example/app/bom/7?mode=edit");

        assert!(timeout(Duration::from_millis(120), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn rapid_followup_navigation_cancels_pending_evaluation() {
        let (watcher, mut rx) =
            watcher_with_window(60, "https://plm.example/app/bom/7?mode=edit");
        // Qualifying flip...
        watcher.observe("https://plm.example/app/bom/7?mode=view");
        // ...superseded inside the settle window by a hop to another tab.
        sleep(Duration::from_millis(10)).await;
        watcher.observe("https://plm.example/app/grid?mode=view");

        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn unchanged_href_is_a_noop() {
        let (watcher, mut rx) =
            watcher_with_window(20, "https://plm.example/app/bom/7?mode=edit");
        watcher.observe("https://plm.example/app/bom/7?mode=edit");
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn safety_poll_picks_up_silent_changes() {
        struct FakeAddress {
            href: Mutex<String>,
        }
        impl AddressProvider for FakeAddress {
            fn current_href(&self) -> String {
                self.href.lock().clone()
            }
        }

        let (watcher, mut rx) =
            watcher_with_window(20, "https://plm.example/app/bom/7?mode=edit");
        let provider = Arc::new(FakeAddress {
            href: Mutex::new("https://plm.example/app/bom/7?mode=edit".to_string()),
        });
        let provider_dyn: Arc<dyn AddressProvider> = Arc::clone(&provider) as Arc<dyn AddressProvider>;
        let poll = watcher.spawn_poll(provider_dyn);

        *provider.href.lock() = "https://plm.example/app/bom/7?mode=view".to_string();

        let signal = timeout(Duration::from_millis(700), rx.recv())
            .await
            .expect("poll-driven trigger")
            .expect("signal");
        assert_eq!(signal.context.tab, TabToken::Bom);

        poll.shutdown().await.expect("shutdown poll");
    }
}
