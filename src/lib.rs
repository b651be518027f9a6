pub mod async_publisher;
pub mod config;
pub mod connection_string;
pub mod error;
pub mod model;
pub mod queue;
pub mod retry;
pub mod service;
pub mod sync_publisher;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Note: This function can only be called once per process. Embedding
/// applications that already install a subscriber should skip it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
