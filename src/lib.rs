//! EditTrigger kernel
//!
//! Watches a PLM web workspace for edit-completion signals — the address
//! flipping from `mode=edit` to `mode=view` on a tab, or successful writes
//! to the attachments / bill-of-materials endpoints — and automatically runs
//! the remote action scripts whose labels declare `{tab: <tab>, mode: onEdit}`.
//!
//! The kernel owns no I/O of its own: the host environment feeds address
//! changes and completed requests in, an external loader publishes the
//! script registry, and an injected runner executes the scripts.

pub mod config;
pub mod kernel;
pub mod telemetry;

pub use config::KernelConfig;
pub use kernel::TriggerKernel;

// Re-export commonly used types for hosts
pub use edittrigger_core_types::{
    ActionScript, HttpMethod, ScriptId, TabToken, TriggerContext, TriggerError, TriggerReason,
    WriteClass, WriteEvent,
};
pub use edittrigger_event_bus::{TriggerBus, TriggerSignal};
pub use edittrigger_registry::{
    NoopRunner, RetryPolicy, ScriptRunner, ScriptStore, SharedScriptStore,
};
pub use edittrigger_route_watch::AddressProvider;
