use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use edittrigger_core_types::{DispatchId, TabToken, TriggerContext};
use edittrigger_label_meta::is_on_edit_candidate;
use edittrigger_registry::{RetryPolicy, ScriptRunner, ScriptStore};

/// Outcome counts for one dispatch evaluation.
#[derive(Clone, Debug)]
pub struct DispatchReport {
    pub id: DispatchId,
    pub matched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn empty(id: DispatchId) -> Self {
        Self {
            id,
            matched: 0,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Single entry point for both trigger sources.
///
/// One matching algorithm and one failure-isolation policy, regardless of
/// whether the signal came from a URL flip or a network write.
pub struct TriggerDispatcher {
    store: Arc<dyn ScriptStore>,
    runner: Arc<dyn ScriptRunner>,
    retry: RetryPolicy,
}

impl TriggerDispatcher {
    pub fn new(
        store: Arc<dyn ScriptStore>,
        runner: Arc<dyn ScriptRunner>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            runner,
            retry,
        }
    }

    /// Run every script whose label declares `{tab: <tab>, mode: onEdit}`.
    ///
    /// Matched scripts run sequentially in registry order; a failing script
    /// is logged and does not stop the ones after it. `context.reason` is
    /// diagnostics only and never affects matching.
    pub async fn run_on_edit(&self, tab: &TabToken, context: &TriggerContext) -> DispatchReport {
        let id = DispatchId::new();

        let Some(scripts) = self.await_registry().await else {
            warn!(
                dispatch = %id,
                tab = %tab,
                "script registry never became available, dropping dispatch"
            );
            return DispatchReport::empty(id);
        };

        let targets: Vec<_> = scripts
            .iter()
            .filter(|script| is_on_edit_candidate(script, tab))
            .collect();
        if targets.is_empty() {
            debug!(dispatch = %id, tab = %tab, "no onEdit scripts for tab");
            return DispatchReport::empty(id);
        }

        let payload = context.payload();
        let mut succeeded = 0;
        let mut failed = 0;
        for script in &targets {
            match self.runner.run(script, payload.clone()).await {
                Ok(()) => {
                    succeeded += 1;
                    debug!(dispatch = %id, script = %script.id.0, "onEdit script completed");
                }
                Err(err) => {
                    failed += 1;
                    error!(
                        dispatch = %id,
                        script = %script.id.0,
                        error = %err,
                        "onEdit script failed"
                    );
                }
            }
        }

        info!(
            dispatch = %id,
            tab = %tab,
            reason = context.reason.as_str(),
            matched = targets.len(),
            succeeded,
            failed,
            "onEdit dispatch finished"
        );
        DispatchReport {
            id,
            matched: targets.len(),
            succeeded,
            failed,
        }
    }

    /// Re-read the registry slot until the loader has published, bounded by
    /// the retry policy. Empty and absent are both "not ready yet".
    async fn await_registry(&self) -> Option<Vec<edittrigger_core_types::ActionScript>> {
        let mut attempt = 0u32;
        loop {
            match self.store.snapshot().await {
                Some(scripts) if !scripts.is_empty() => return Some(scripts),
                _ => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return None;
                    }
                    sleep(self.retry.delay()).await;
                }
            }
        }
    }
}
