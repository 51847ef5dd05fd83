//! services/countdown/src/telemetry.rs
//!
//! Installs the `tracing` subscriber for embedders that do not bring their own.

use crate::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sets up an env-filtered `fmt` subscriber at the configured level.
///
/// Returns `false` when a global subscriber was already installed by the host.
pub fn init_tracing(config: &Config) -> bool {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
