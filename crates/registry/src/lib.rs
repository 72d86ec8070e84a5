pub mod api;
pub mod retry;
pub mod runner;
pub mod store;

pub use api::{ScriptRunner, ScriptStore};
pub use retry::RetryPolicy;
pub use runner::{NoopRunner, RecordingRunner};
pub use store::SharedScriptStore;
