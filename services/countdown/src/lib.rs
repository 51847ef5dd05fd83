pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;

pub use app::build_countdown;
pub use config::{Config, ConfigError};
pub use error::EngineError;
pub use telemetry::init_tracing;
