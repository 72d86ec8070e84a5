//! URL transition watcher.
//!
//! The host page exposes no save-completion event; the only observable
//! signal for "user finished editing" is the address flipping from
//! `mode=edit` to `mode=view` on the same logical tab. The host wires its
//! address-change notifications into [`RouteWatcher::observe`] and may
//! additionally run the safety poll for changes its hooks miss.

pub mod config;
pub mod route;
pub mod watcher;

pub use config::RouteWatchConfig;
pub use route::route_state;
pub use watcher::{AddressProvider, PollHandle, RouteWatcher};
