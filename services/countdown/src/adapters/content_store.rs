//! services/countdown/src/adapters/content_store.rs
//!
//! This module contains the artifact blob adapter. Artifacts live as files in an
//! application-private cache directory and are referenced by file name.

use async_trait::async_trait;
use countdown_core::domain::ArtifactRef;
use countdown_core::ports::{ContentStore, PortError, PortResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// A `ContentStore` that keeps each artifact in its own file.
#[derive(Clone, Debug)]
pub struct FsContentStore {
    dir: PathBuf,
}

impl FsContentStore {
    /// Creates a new `FsContentStore` rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// A reference must be a bare file name inside the store directory.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

//=========================================================================================
// `ContentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentStore for FsContentStore {
    async fn write(&self, bytes: Vec<u8>) -> PortResult<ArtifactRef> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PortError::StoreUnavailable(format!("creating {}: {e}", self.dir.display()))
        })?;

        let name = format!("countdown_{}.png", Uuid::new_v4().simple());
        let tmp = self.dir.join(format!(".{name}.partial"));
        let path = self.dir.join(&name);

        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| PortError::StoreUnavailable(format!("writing {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            fs::remove_file(&tmp).await.ok();
            return Err(PortError::StoreUnavailable(format!(
                "moving {} into place: {e}",
                path.display()
            )));
        }

        debug!(path = %path.display(), len = bytes.len(), "Artifact written");
        Ok(ArtifactRef::new(name))
    }

    fn resolve(&self, artifact: &ArtifactRef) -> PortResult<PathBuf> {
        if !is_plain_name(artifact.as_str()) {
            return Err(PortError::InvalidInput(format!(
                "'{artifact}' is not an artifact reference"
            )));
        }
        Ok(self.dir.join(artifact.as_str()))
    }

    async fn remove(&self, artifact: &ArtifactRef) -> PortResult<()> {
        let path = self.resolve(artifact)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Artifact removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::StoreUnavailable(format!(
                "removing {}: {e}",
                path.display()
            ))),
        }
    }
}
