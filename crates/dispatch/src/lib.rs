pub mod dispatcher;
pub mod worker;

pub use dispatcher::{DispatchReport, TriggerDispatcher};
pub use worker::{DispatchLoop, DispatchLoopHandle};
