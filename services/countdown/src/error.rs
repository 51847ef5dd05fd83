//! services/countdown/src/error.rs
//!
//! Defines the primary error type for assembling and running the engine.

use crate::config::ConfigError;
use countdown_core::ports::PortError;

/// The primary error type for the `countdown` service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., creating the storage directories).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
