//! Broadcast publish/subscribe surface shared by the trigger watchers.
//!
//! Both watchers publish [`TriggerSignal`]s here and the dispatch loop
//! consumes them, so there is exactly one place where trigger traffic flows
//! regardless of which watcher produced it.

use std::sync::Arc;

use tokio::sync::broadcast;

use edittrigger_core_types::{TriggerContext, TriggerError};

/// One "run the matching onEdit scripts" request produced by a watcher.
#[derive(Clone, Debug)]
pub struct TriggerSignal {
    pub context: TriggerContext,
}

impl TriggerSignal {
    pub fn new(context: TriggerContext) -> Self {
        Self { context }
    }
}

/// Receiver half of the trigger bus.
pub type TriggerReceiver = broadcast::Receiver<TriggerSignal>;

/// In-memory broadcast bus carrying trigger signals from the watchers to
/// the dispatch loop.
pub struct TriggerBus {
    sender: broadcast::Sender<TriggerSignal>,
}

impl TriggerBus {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    /// Fan a signal out to every subscriber. Errors when nobody is
    /// listening (e.g. during teardown); callers treat that as diagnostic.
    pub fn publish(&self, signal: TriggerSignal) -> Result<(), TriggerError> {
        self.sender
            .send(signal)
            .map(|_| ())
            .map_err(|err| TriggerError::new(err.to_string()))
    }

    pub fn subscribe(&self) -> TriggerReceiver {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edittrigger_core_types::TabToken;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = TriggerBus::new(8);
        let mut rx_a = bus.subscribe();
        let mut rx_b = bus.subscribe();

        let signal = TriggerSignal::new(TriggerContext::url_flip(
            TabToken::Bom,
            "https://plm.example/bom/1?mode=view",
        ));
        bus.publish(signal).expect("publish");

        assert_eq!(rx_a.recv().await.expect("recv a").context.tab, TabToken::Bom);
        assert_eq!(rx_b.recv().await.expect("recv b").context.tab, TabToken::Bom);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_an_error() {
        let bus = TriggerBus::new(4);
        let signal = TriggerSignal::new(TriggerContext::url_flip(TabToken::Grid, "x"));
        assert!(bus.publish(signal).is_err());
    }
}
