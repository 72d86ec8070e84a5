use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use edittrigger_event_bus::TriggerBus;

use crate::dispatcher::TriggerDispatcher;

/// Consumes trigger signals from the bus and drives the dispatcher.
pub struct DispatchLoop;

/// Lifecycle handle for the spawned consumer task.
pub struct DispatchLoopHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DispatchLoopHandle {
    /// Gracefully stop the loop and await its completion.
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

impl Drop for DispatchLoopHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl DispatchLoop {
    pub fn spawn(
        bus: Arc<TriggerBus>,
        dispatcher: Arc<TriggerDispatcher>,
    ) -> DispatchLoopHandle {
        let cancel = CancellationToken::new();
        let loop_token = cancel.clone();
        let mut rx = bus.subscribe();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(signal) => {
                            let tab = signal.context.tab.clone();
                            let report = dispatcher.run_on_edit(&tab, &signal.context).await;
                            debug!(
                                dispatch = %report.id,
                                matched = report.matched,
                                "trigger signal handled"
                            );
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "trigger signals lagged, continuing");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });
        DispatchLoopHandle {
            cancel,
            task: Some(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use edittrigger_core_types::{ActionScript, TabToken, TriggerContext};
    use edittrigger_event_bus::TriggerSignal;
    use edittrigger_registry::{RecordingRunner, RetryPolicy, SharedScriptStore};

    #[tokio::test]
    async fn loop_drains_signals_from_the_bus() {
        let store = Arc::new(SharedScriptStore::new());
        store
            .publish(vec![ActionScript::new("s", "S {tab: bom, mode: onEdit}")])
            .await;
        let runner = Arc::new(RecordingRunner::new());
        let dispatcher = Arc::new(TriggerDispatcher::new(
            store,
            Arc::clone(&runner) as Arc<dyn edittrigger_registry::ScriptRunner>,
            RetryPolicy {
                max_attempts: 2,
                delay_ms: 5,
            },
        ));

        let bus = TriggerBus::new(8);
        let handle = DispatchLoop::spawn(Arc::clone(&bus), dispatcher);

        bus.publish(TriggerSignal::new(TriggerContext::url_flip(
            TabToken::Bom,
            "https://plm.example/bom/2?mode=view",
        )))
        .expect("publish signal");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runner.call_count(), 1);

        handle.shutdown().await.expect("shutdown loop");
    }
}
