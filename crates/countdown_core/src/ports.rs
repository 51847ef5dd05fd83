//! crates/countdown_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the engine's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like file systems or APIs.

use crate::domain::{ArtifactRef, CountdownRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., file system, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The image stage failed. Aborts the refresh; the previous artifact stays authoritative.
    #[error("Image generation failed: {0}")]
    GenerationFailed(String),
    /// The prompt stage failed. Only ever seen by the prompt synthesizer, which
    /// replaces it with the fallback prompt.
    #[error("Prompt synthesis failed: {0}")]
    PromptSynthesisFailed(String),
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),
    #[error("A refresh is already in progress")]
    RefreshInProgress,
    #[error("No countdown has been set up")]
    NotSetUp,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key-value storage holding the single serialized countdown record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self) -> PortResult<Option<CountdownRecord>>;

    /// Replaces the stored record in a single atomic write.
    async fn put(&self, record: &CountdownRecord) -> PortResult<()>;
}

/// Blob storage for generated artifacts.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persists the bytes and returns a reference to them. Takes ownership of the artifact.
    async fn write(&self, bytes: Vec<u8>) -> PortResult<ArtifactRef>;

    /// Turns a reference into a readable location.
    fn resolve(&self, artifact: &ArtifactRef) -> PortResult<PathBuf>;

    async fn remove(&self, artifact: &ArtifactRef) -> PortResult<()>;
}

#[async_trait]
pub trait TextCompletionService: Send + Sync {
    /// Sends a single user message and returns the first completion's raw text.
    async fn complete(&self, instruction: &str) -> PortResult<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generates raw image bytes for a prompt.
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>>;
}

/// Source of "today" as a calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The device's local calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
