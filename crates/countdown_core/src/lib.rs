pub mod cache;
pub mod countdown;
pub mod domain;
pub mod image;
pub mod ports;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{ArtifactCache, Refresh};
pub use countdown::Countdown;
pub use domain::{ArtifactRef, CachedArtifact, CountdownEdit, CountdownRecord, CountdownView};
pub use image::ImageSynthesizer;
pub use ports::{
    Clock, ContentStore, ImageGenerationService, PortError, PortResult, RecordStore,
    SystemClock, TextCompletionService,
};
pub use prompt::PromptSynthesizer;
