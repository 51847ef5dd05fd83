//! services/countdown/src/config.rs
//!
//! Defines the engine's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const DEFAULT_IMAGE_API_URL: &str =
    "https://router.huggingface.co/hf-inference/models/black-forest-labs/FLUX.1-schnell";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub record_key: String,
    pub openai_api_key: String,
    pub openai_api_base: Option<String>,
    pub prompt_model: String,
    pub prompt_max_tokens: u32,
    pub image_api_url: String,
    pub image_api_token: String,
    pub image_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        // --- Logging ---
        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Storage Locations ---
        let data_dir = PathBuf::from(var_or("COUNTDOWN_DATA_DIR", "./data"));
        let cache_dir = PathBuf::from(var_or("COUNTDOWN_CACHE_DIR", "./cache"));
        let record_key = var_or("COUNTDOWN_RECORD_KEY", "countdownData");
        if record_key.is_empty() || record_key.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue(
                "COUNTDOWN_RECORD_KEY".to_string(),
                format!("'{}' is not a valid storage key", record_key),
            ));
        }

        // --- Prompt Synthesis ---
        let openai_api_key = required("OPENAI_API_KEY")?;
        let openai_api_base = lookup("OPENAI_API_BASE").filter(|v| !v.trim().is_empty());
        let prompt_model = var_or("PROMPT_MODEL", "gpt-4o-mini");
        let max_tokens_str = var_or("PROMPT_MAX_TOKENS", "120");
        let prompt_max_tokens = max_tokens_str
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue("PROMPT_MAX_TOKENS".to_string(), max_tokens_str.clone())
            })?;

        // --- Image Synthesis ---
        let image_api_url = var_or("IMAGE_API_URL", DEFAULT_IMAGE_API_URL);
        let image_api_token = required("IMAGE_API_TOKEN")?;
        let timeout_str = var_or("IMAGE_TIMEOUT_SECS", "120");
        let image_timeout = timeout_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("IMAGE_TIMEOUT_SECS".to_string(), e.to_string()))?;

        Ok(Self {
            log_level,
            data_dir,
            cache_dir,
            record_key,
            openai_api_key,
            openai_api_base,
            prompt_model,
            prompt_max_tokens,
            image_api_url,
            image_api_token,
            image_timeout,
        })
    }
}
