//! Network write watcher.
//!
//! The host environment wires its completed-request notifications into
//! [`NetworkTap::record`]; the tap classifies successful mutating requests
//! against the two interesting endpoint families and coalesces bursts into a
//! single trigger signal per family. It never originates or alters traffic.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace};

use edittrigger_core_types::{HttpMethod, TriggerContext, WriteClass, WriteEvent};
use edittrigger_event_bus::{TriggerBus, TriggerSignal};

pub use crate::config::NetWatchConfig;

static ATTACHMENTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^/api/v3/workspaces/\d+/items/\d+/attachments(?:/.*)?$").unwrap()
});
static BOM_ITEMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^/api/v3/workspaces/\d+/items/\d+/bom-items(?:/.*)?$").unwrap()
});

/// Classify a request path into an endpoint family. Any workspace/item pair
/// counts; related items can be written from the current page.
pub fn classify(path: &str) -> Option<WriteClass> {
    if ATTACHMENTS_RE.is_match(path) {
        Some(WriteClass::Attachments)
    } else if BOM_ITEMS_RE.is_match(path) {
        Some(WriteClass::BomItems)
    } else {
        None
    }
}

/// Watches completed requests and emits one trigger per write burst.
pub struct NetworkTap {
    bus: Arc<TriggerBus>,
    pending: DashMap<WriteClass, JoinHandle<()>>,
    config: NetWatchConfig,
}

impl NetworkTap {
    pub fn new(bus: Arc<TriggerBus>, config: NetWatchConfig) -> Self {
        Self {
            bus,
            pending: DashMap::new(),
            config,
        }
    }

    /// Feed one completed request. Non-mutating methods, failed responses and
    /// unclassifiable paths are dropped without effect.
    pub fn record(&self, event: WriteEvent) {
        if !event.ok || !event.method.is_write() {
            return;
        }
        let Some(class) = classify(&event.path) else {
            trace!(path = %event.path, "write outside watched endpoints");
            return;
        };
        debug!(
            class = class.as_str(),
            method = event.method.as_str(),
            "write observed, scheduling trigger"
        );
        self.schedule(class, event.method);
    }

    /// Last-write-wins timer per endpoint family: each qualifying write
    /// replaces the family's pending timer, so only the settled end of a
    /// burst fires.
    fn schedule(&self, class: WriteClass, method: HttpMethod) {
        let bus = Arc::clone(&self.bus);
        let delay = Duration::from_millis(self.config.debounce_ms);
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let context = TriggerContext::network_write(class.target_tab(), class, method);
            if let Err(err) = bus.publish(TriggerSignal::new(context)) {
                debug!(error = %err, "trigger signal had no consumers");
            }
        });
        if let Some(previous) = self.pending.insert(class, task) {
            previous.abort();
        }
    }

    /// Abort all pending debounce timers (kernel shutdown).
    pub fn abort_pending(&self) {
        for entry in self.pending.iter() {
            entry.value().abort();
        }
        self.pending.clear();
    }
}

impl Drop for NetworkTap {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
