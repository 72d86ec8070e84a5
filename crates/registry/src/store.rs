use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use edittrigger_core_types::ActionScript;

use crate::api::ScriptStore;

/// In-memory registry slot the external loader publishes into.
///
/// Replace-only: each publish swaps the whole script list, matching the
/// loader contract (it refetches the item's scripts and republishes).
#[derive(Default)]
pub struct SharedScriptStore {
    slot: RwLock<Option<Vec<ActionScript>>>,
}

impl SharedScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot contents. Called by the loader, never by the kernel.
    pub async fn publish(&self, scripts: Vec<ActionScript>) {
        debug!(count = scripts.len(), "script registry published");
        let mut guard = self.slot.write().await;
        *guard = Some(scripts);
    }

    /// Empty the slot, returning it to the "loader not ready" state.
    pub async fn clear(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }
}

#[async_trait]
impl ScriptStore for SharedScriptStore {
    async fn snapshot(&self) -> Option<Vec<ActionScript>> {
        self.slot.read().await.clone()
    }
}
