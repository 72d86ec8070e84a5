use async_trait::async_trait;
use serde_json::Value;

use edittrigger_core_types::{ActionScript, TriggerError};

/// Read side of the script registry slot.
///
/// The slot is populated by an external loader at an unspecified time, so
/// `snapshot` returns `None` until the first publish. Callers treat the
/// result as a live, possibly-stale snapshot and re-read it on every
/// dispatch attempt.
#[async_trait]
pub trait ScriptStore: Send + Sync {
    async fn snapshot(&self) -> Option<Vec<ActionScript>>;
}

/// The injected "run this server-side script" collaborator.
///
/// The kernel never originates HTTP traffic itself; whatever POSTs the
/// script execution lives behind this seam.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &ActionScript, context: Value) -> Result<(), TriggerError>;
}
