//! services/countdown/src/adapters/record_store.rs
//!
//! This module contains the key-value record adapter, the concrete implementation
//! of the `RecordStore` port. One key maps to one JSON file in the data directory.

use async_trait::async_trait;
use countdown_core::domain::CountdownRecord;
use countdown_core::ports::{PortError, PortResult, RecordStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// A `RecordStore` backed by a single JSON file.
#[derive(Clone, Debug)]
pub struct FileRecordStore {
    dir: PathBuf,
    key: String,
}

impl FileRecordStore {
    /// Creates a new `FileRecordStore` storing `key` under `dir`.
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

fn store_error(action: &str, path: &Path, e: impl std::fmt::Display) -> PortError {
    PortError::StoreUnavailable(format!("{action} {}: {e}", path.display()))
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&self) -> PortResult<Option<CountdownRecord>> {
        let path = self.path();
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error("reading", &path, e)),
        };
        let record = serde_json::from_slice(&raw).map_err(|e| store_error("parsing", &path, e))?;
        Ok(Some(record))
    }

    /// Writes to a temporary sibling first and renames it over the old file.
    async fn put(&self, record: &CountdownRecord) -> PortResult<()> {
        let path = self.path();
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| store_error("creating", &self.dir, e))?;

        let json = serde_json::to_vec_pretty(record).map_err(|e| store_error("encoding", &path, e))?;
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", self.key, Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&tmp, &json).await {
            fs::remove_file(&tmp).await.ok();
            return Err(store_error("writing", &tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            fs::remove_file(&tmp).await.ok();
            return Err(store_error("replacing", &path, e));
        }
        debug!(path = %path.display(), "Countdown record saved");
        Ok(())
    }
}

/// Writes `bytes` and flushes them to disk, so a rename never exposes a
/// record whose contents are still in the page cache.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
