//! Tracing setup for hosts and tests.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a fmt subscriber honouring `RUST_LOG`, defaulting to `info`.
/// Safe to call once per process; hosts embedding the kernel into a larger
/// tracing setup should skip this and install their own.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
