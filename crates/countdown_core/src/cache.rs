//! crates/countdown_core/src/cache.rs
//!
//! The daily artifact cache. Decides whether the record's artifact is still
//! valid for today and, when it is not, runs prompt synthesis, image synthesis,
//! the content write and the record write, in that order.

use crate::domain::{ArtifactRef, CountdownRecord};
use crate::image::ImageSynthesizer;
use crate::ports::{Clock, ContentStore, PortError, PortResult, RecordStore};
use crate::prompt::PromptSynthesizer;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result of a refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    pub record: Option<CountdownRecord>,
    pub artifact_ref: Option<ArtifactRef>,
    pub was_regenerated: bool,
}

impl Refresh {
    fn unchanged(record: Option<&CountdownRecord>) -> Self {
        Self {
            artifact_ref: record.and_then(|r| r.cached_artifact_ref().cloned()),
            record: record.cloned(),
            was_regenerated: false,
        }
    }
}

pub struct ArtifactCache {
    prompts: PromptSynthesizer,
    images: ImageSynthesizer,
    content: Arc<dyn ContentStore>,
    records: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    /// Held for the whole of a refresh. A second refresh is rejected, not interleaved.
    in_flight: Mutex<()>,
}

impl ArtifactCache {
    pub fn new(
        prompts: PromptSynthesizer,
        images: ImageSynthesizer,
        content: Arc<dyn ContentStore>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            prompts,
            images,
            content,
            records,
            clock,
            in_flight: Mutex::new(()),
        }
    }

    /// True while a refresh holds the in-flight guard.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Takes the in-flight guard, or fails with `RefreshInProgress`.
    pub(crate) fn begin(&self) -> PortResult<MutexGuard<'_, ()>> {
        self.in_flight
            .try_lock()
            .map_err(|_| PortError::RefreshInProgress)
    }

    /// Makes sure the record has an artifact generated today.
    ///
    /// An absent or unset record, a fresh artifact, or a target date in the past
    /// all return the input untouched with `was_regenerated == false`.
    pub async fn ensure_fresh(&self, record: Option<&CountdownRecord>) -> PortResult<Refresh> {
        let guard = self.begin()?;
        self.ensure_fresh_locked(&guard, record).await
    }

    /// `ensure_fresh` for a caller that already holds the in-flight guard.
    pub(crate) async fn ensure_fresh_locked(
        &self,
        _guard: &MutexGuard<'_, ()>,
        record: Option<&CountdownRecord>,
    ) -> PortResult<Refresh> {
        let record = match record {
            Some(r) if r.is_set_up() => r,
            other => {
                debug!("No countdown set up; nothing to refresh");
                return Ok(Refresh::unchanged(other));
            }
        };

        let today = self.clock.today();
        if record.cached_artifact_ref().is_some() && record.is_fresh_on(today) {
            debug!(%today, "Cached artifact is fresh");
            return Ok(Refresh::unchanged(Some(record)));
        }

        info!(
            %today,
            last_generated = ?record.last_generated_date(),
            "Cached artifact is stale"
        );
        self.regenerate(record, today).await
    }

    /// Regenerates regardless of freshness. Still refuses once the target date has passed.
    pub async fn force_regenerate(&self, record: &CountdownRecord) -> PortResult<Refresh> {
        let guard = self.begin()?;
        self.force_regenerate_locked(&guard, record).await
    }

    /// `force_regenerate` for a caller that already holds the in-flight guard.
    pub(crate) async fn force_regenerate_locked(
        &self,
        _guard: &MutexGuard<'_, ()>,
        record: &CountdownRecord,
    ) -> PortResult<Refresh> {
        if !record.is_set_up() {
            return Err(PortError::NotSetUp);
        }
        let today = self.clock.today();
        info!(%today, "Forced regeneration requested");
        self.regenerate(record, today).await
    }

    async fn regenerate(&self, record: &CountdownRecord, today: NaiveDate) -> PortResult<Refresh> {
        let days_left = record.days_remaining(today);
        if days_left < 0 {
            info!(days_left, "Target date has passed; not generating");
            return Ok(Refresh::unchanged(Some(record)));
        }

        let prompt = self
            .prompts
            .synthesize(&record.event_description, days_left, record.style())
            .await;
        let bytes = self.images.synthesize(&prompt).await?;

        let artifact_ref = self.content.write(bytes).await?;
        let updated = record.with_artifact(artifact_ref.clone(), today);
        if let Err(e) = self.records.put(&updated).await {
            warn!(error = %e, artifact = %artifact_ref, "Record write failed; discarding new artifact");
            self.discard(&artifact_ref).await;
            return Err(e);
        }
        info!(artifact = %artifact_ref, days_left, "Artifact regenerated");

        if let Some(previous) = record.cached_artifact_ref() {
            if previous != &artifact_ref {
                self.discard(previous).await;
            }
        }

        Ok(Refresh {
            record: Some(updated),
            artifact_ref: Some(artifact_ref),
            was_regenerated: true,
        })
    }

    /// Best-effort blob removal.
    async fn discard(&self, artifact: &ArtifactRef) {
        if let Err(e) = self.content.remove(artifact).await {
            warn!(error = %e, artifact = %artifact, "Could not remove artifact");
        }
    }
}
