use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use edittrigger_core_types::{ActionScript, ScriptId, TriggerError};

use crate::api::ScriptRunner;

/// Runner that acknowledges every invocation without doing anything.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoopRunner;

#[async_trait]
impl ScriptRunner for NoopRunner {
    async fn run(&self, _script: &ActionScript, _context: Value) -> Result<(), TriggerError> {
        Ok(())
    }
}

/// Runner that records invocations and can fail selected scripts; used by
/// dispatcher and kernel tests.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(ScriptId, Value)>>,
    fail: Mutex<Vec<ScriptId>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make future invocations of the given script fail.
    pub fn fail_script(&self, id: ScriptId) {
        self.fail.lock().push(id);
    }

    pub fn calls(&self) -> Vec<(ScriptId, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ScriptRunner for RecordingRunner {
    async fn run(&self, script: &ActionScript, context: Value) -> Result<(), TriggerError> {
        self.calls.lock().push((script.id.clone(), context));
        if self.fail.lock().contains(&script.id) {
            return Err(TriggerError::new(format!(
                "runner failed for {}",
                script.id.0
            )));
        }
        Ok(())
    }
}
