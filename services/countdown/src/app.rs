//! services/countdown/src/app.rs
//!
//! Assembles a ready-to-use `Countdown` from configuration.

use crate::adapters::{FileRecordStore, FsContentStore, HttpImageAdapter, OpenAiPromptAdapter};
use crate::config::Config;
use crate::error::EngineError;
use async_openai::{config::OpenAIConfig, Client};
use countdown_core::{Countdown, SystemClock};
use std::sync::Arc;
use tracing::info;

/// Builds the engine with file-backed storage, the OpenAI prompt adapter and
/// the HTTP image adapter. Creates the storage directories if needed.
pub async fn build_countdown(config: &Config) -> Result<Countdown, EngineError> {
    // --- 1. Prepare Storage ---
    tokio::fs::create_dir_all(&config.data_dir).await?;
    tokio::fs::create_dir_all(&config.cache_dir).await?;
    let records = Arc::new(FileRecordStore::new(
        config.data_dir.clone(),
        config.record_key.clone(),
    ));
    let content = Arc::new(FsContentStore::new(config.cache_dir.clone()));
    info!(
        data_dir = %config.data_dir.display(),
        cache_dir = %config.cache_dir.display(),
        "Storage ready"
    );

    // --- 2. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    if let Some(base) = &config.openai_api_base {
        openai_config = openai_config.with_api_base(base.clone());
    }
    let completions = Arc::new(OpenAiPromptAdapter::new(
        Client::with_config(openai_config),
        config.prompt_model.clone(),
        config.prompt_max_tokens,
    ));
    let images = Arc::new(HttpImageAdapter::new(
        config.image_api_url.clone(),
        config.image_api_token.clone(),
        config.image_timeout,
    )?);
    info!(model = %config.prompt_model, "Generation adapters ready");

    // --- 3. Build the Engine ---
    Ok(Countdown::new(
        records,
        content,
        completions,
        images,
        Arc::new(SystemClock),
    ))
}
