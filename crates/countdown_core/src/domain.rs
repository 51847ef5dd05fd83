//! crates/countdown_core/src/domain.rs
//!
//! Defines the pure, core data structures for the countdown engine.
//! Dates are calendar days (`NaiveDate`); nothing here knows about clocks,
//! files, or the network.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque locator for an artifact held by a `ContentStore`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The cached artifact paired with the calendar day it was produced on.
///
/// The two halves only ever travel together, so a record can never hold a
/// reference without a generation date or the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedArtifact {
    pub last_generated_date: NaiveDate,
    pub cached_artifact_ref: ArtifactRef,
}

/// The single persisted countdown.
///
/// Serialized as a flat JSON object: `targetDate`, `eventDescription`,
/// `imageStyle`, `lastGeneratedDate`, `cachedArtifactRef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownRecord {
    pub target_date: NaiveDate,
    pub event_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,
    #[serde(flatten)]
    pub cached: Option<CachedArtifact>,
}

impl CountdownRecord {
    /// Creates a record with no cached artifact yet.
    pub fn new(
        event_description: impl Into<String>,
        target_date: NaiveDate,
        image_style: Option<String>,
    ) -> Self {
        Self {
            target_date,
            event_description: event_description.into(),
            image_style,
            cached: None,
        }
    }

    /// A record is set up once it carries a non-empty event description.
    pub fn is_set_up(&self) -> bool {
        !self.event_description.trim().is_empty()
    }

    /// Calendar days from `today` until the target date. Negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        days_between(today, self.target_date)
    }

    /// The style hint, if it holds anything besides whitespace.
    pub fn style(&self) -> Option<&str> {
        self.image_style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn last_generated_date(&self) -> Option<NaiveDate> {
        self.cached.as_ref().map(|c| c.last_generated_date)
    }

    pub fn cached_artifact_ref(&self) -> Option<&ArtifactRef> {
        self.cached.as_ref().map(|c| &c.cached_artifact_ref)
    }

    /// True when the cached artifact was generated on the same calendar day as `today`.
    pub fn is_fresh_on(&self, today: NaiveDate) -> bool {
        self.last_generated_date() == Some(today)
    }

    /// Returns a copy of this record pointing at a newly generated artifact.
    pub fn with_artifact(&self, artifact: ArtifactRef, generated_on: NaiveDate) -> Self {
        Self {
            cached: Some(CachedArtifact {
                last_generated_date: generated_on,
                cached_artifact_ref: artifact,
            }),
            ..self.clone()
        }
    }
}

/// Signed calendar-day difference `to - from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Read-only projection of the countdown for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownView {
    pub is_set_up: bool,
    pub event_description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub image_style: Option<String>,
    pub days_remaining: Option<i64>,
    /// Readable location of the current artifact, if one exists.
    pub artifact: Option<std::path::PathBuf>,
    /// Set while a refresh or regeneration is outstanding.
    pub is_generating: bool,
}

/// A partial update to the countdown's user-editable fields.
///
/// `image_style: Some(None)` clears the style.
#[derive(Debug, Clone, Default)]
pub struct CountdownEdit {
    pub event_description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub image_style: Option<Option<String>>,
}
