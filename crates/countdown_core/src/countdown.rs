//! crates/countdown_core/src/countdown.rs
//!
//! The surface a UI shell talks to. Loads and saves the record, applies edits,
//! triggers refreshes, and projects everything into a read-only `CountdownView`.

use crate::cache::{ArtifactCache, Refresh};
use crate::domain::{CountdownEdit, CountdownRecord, CountdownView};
use crate::image::ImageSynthesizer;
use crate::ports::{
    Clock, ContentStore, ImageGenerationService, PortError, PortResult, RecordStore,
    TextCompletionService,
};
use crate::prompt::PromptSynthesizer;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Countdown {
    records: Arc<dyn RecordStore>,
    content: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
    cache: ArtifactCache,
}

impl Countdown {
    pub fn new(
        records: Arc<dyn RecordStore>,
        content: Arc<dyn ContentStore>,
        completions: Arc<dyn TextCompletionService>,
        images: Arc<dyn ImageGenerationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ArtifactCache::new(
            PromptSynthesizer::new(completions),
            ImageSynthesizer::new(images),
            content.clone(),
            records.clone(),
            clock.clone(),
        );
        Self {
            records,
            content,
            clock,
            cache,
        }
    }

    pub async fn load_countdown_data(&self) -> PortResult<Option<CountdownRecord>> {
        self.records.get().await
    }

    pub async fn save_countdown_data(&self, record: &CountdownRecord) -> PortResult<()> {
        let _guard = self.cache.begin()?;
        self.records.put(record).await
    }

    /// Creates (or replaces) the countdown and generates today's artifact.
    ///
    /// The record is committed before generation starts, so an image failure
    /// still leaves a set-up countdown behind.
    pub async fn start_countdown(
        &self,
        event_description: &str,
        target_date: NaiveDate,
        image_style: Option<String>,
    ) -> PortResult<Refresh> {
        let description = event_description.trim();
        if description.is_empty() {
            return Err(PortError::InvalidInput(
                "event description must not be empty".to_string(),
            ));
        }
        let image_style = image_style.filter(|s| !s.trim().is_empty());

        let guard = self.cache.begin()?;
        let previous = self.records.get().await.ok().flatten();
        let record = CountdownRecord::new(description, target_date, image_style);
        self.records.put(&record).await?;
        if let Some(old) = previous.as_ref().and_then(|r| r.cached_artifact_ref()) {
            if let Err(e) = self.content.remove(old).await {
                warn!(error = %e, artifact = %old, "Could not remove replaced artifact");
            }
        }
        info!(%target_date, "Countdown started");

        self.cache.ensure_fresh_locked(&guard, Some(&record)).await
    }

    /// Applies an edit. Changing anything that feeds the prompt drops the cached
    /// artifact, so the next refresh produces one for the new content.
    pub async fn edit(&self, edit: CountdownEdit) -> PortResult<CountdownRecord> {
        let _guard = self.cache.begin()?;
        let mut record = self.records.get().await?.ok_or(PortError::NotSetUp)?;

        let mut changed = false;
        if let Some(description) = edit.event_description {
            let description = description.trim();
            if description.is_empty() {
                return Err(PortError::InvalidInput(
                    "event description must not be empty".to_string(),
                ));
            }
            changed |= record.event_description != description;
            record.event_description = description.to_string();
        }
        if let Some(target_date) = edit.target_date {
            changed |= record.target_date != target_date;
            record.target_date = target_date;
        }
        if let Some(style) = edit.image_style {
            let style = style.filter(|s| !s.trim().is_empty());
            changed |= record.image_style != style;
            record.image_style = style;
        }

        if !changed {
            return Ok(record);
        }

        let superseded = record.cached.take();
        self.records.put(&record).await?;
        if let Some(cached) = superseded {
            if let Err(e) = self.content.remove(&cached.cached_artifact_ref).await {
                warn!(error = %e, artifact = %cached.cached_artifact_ref, "Could not remove superseded artifact");
            }
        }
        info!("Countdown edited");
        Ok(record)
    }

    /// Loads the record and makes sure today's artifact exists.
    ///
    /// The guard is taken before the load, so a concurrent edit is either
    /// rejected or fully visible to this refresh.
    pub async fn refresh(&self) -> PortResult<Refresh> {
        let guard = self.cache.begin()?;
        let record = self.records.get().await?.ok_or(PortError::NotSetUp)?;
        self.cache.ensure_fresh_locked(&guard, Some(&record)).await
    }

    /// Loads the record and regenerates the artifact unconditionally.
    pub async fn regenerate(&self) -> PortResult<Refresh> {
        let guard = self.cache.begin()?;
        let record = self.records.get().await?.ok_or(PortError::NotSetUp)?;
        self.cache.force_regenerate_locked(&guard, &record).await
    }

    /// Readable location of the record's artifact, for handing to a gallery exporter.
    pub fn artifact_for_save(&self, record: &CountdownRecord) -> PortResult<Option<PathBuf>> {
        record
            .cached_artifact_ref()
            .map(|artifact| self.content.resolve(artifact))
            .transpose()
    }

    /// Current state as the presentation layer sees it. A load failure shows as "not set up".
    pub async fn view(&self) -> CountdownView {
        let is_generating = self.cache.is_refreshing();
        let record = match self.records.get().await {
            Ok(Some(record)) if record.is_set_up() => record,
            Ok(_) => {
                return CountdownView {
                    is_generating,
                    ..CountdownView::default()
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not load countdown; showing setup state");
                return CountdownView {
                    is_generating,
                    ..CountdownView::default()
                };
            }
        };

        let artifact = match self.artifact_for_save(&record) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Could not resolve cached artifact");
                None
            }
        };

        CountdownView {
            is_set_up: true,
            days_remaining: Some(record.days_remaining(self.clock.today())),
            event_description: Some(record.event_description),
            target_date: Some(record.target_date),
            image_style: record.image_style,
            artifact,
            is_generating,
        }
    }
}
