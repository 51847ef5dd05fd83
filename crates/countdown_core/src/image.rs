//! crates/countdown_core/src/image.rs
//!
//! Wraps the remote image generator so every failure reaches the cache as
//! `PortError::GenerationFailed`.

use crate::ports::{ImageGenerationService, PortError, PortResult};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ImageSynthesizer {
    images: Arc<dyn ImageGenerationService>,
}

impl ImageSynthesizer {
    pub fn new(images: Arc<dyn ImageGenerationService>) -> Self {
        Self { images }
    }

    /// Returns the raw bytes exactly as received. No image decoding takes place.
    pub async fn synthesize(&self, prompt: &str) -> PortResult<Vec<u8>> {
        let bytes = self.images.generate_image(prompt).await.map_err(|e| {
            warn!(error = %e, "Image generation failed");
            match e {
                PortError::GenerationFailed(msg) => PortError::GenerationFailed(msg),
                other => PortError::GenerationFailed(other.to_string()),
            }
        })?;

        if bytes.is_empty() {
            warn!("Image generation returned an empty body");
            return Err(PortError::GenerationFailed(
                "image endpoint returned no bytes".to_string(),
            ));
        }

        debug!(len = bytes.len(), "Received image bytes");
        Ok(bytes)
    }
}
