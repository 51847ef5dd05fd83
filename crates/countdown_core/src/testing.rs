//! In-memory fakes for the core's ports, shared by the unit tests.

use crate::domain::{ArtifactRef, CountdownRecord};
use crate::ports::{
    Clock, ContentStore, ImageGenerationService, PortError, PortResult, RecordStore,
    TextCompletionService,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    pub record: Mutex<Option<CountdownRecord>>,
    pub puts: AtomicUsize,
    pub fail_get: AtomicBool,
    pub fail_put: AtomicBool,
    /// When set, the next `get` snapshots the record and then waits for `get_release`.
    pub gate_next_get: AtomicBool,
    pub get_started: Notify,
    pub get_release: Notify,
}

impl MemoryRecordStore {
    pub fn with(record: CountdownRecord) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(record);
        store
    }

    pub fn current(&self) -> Option<CountdownRecord> {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self) -> PortResult<Option<CountdownRecord>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(PortError::StoreUnavailable("disk unreadable".into()));
        }
        let snapshot = self.current();
        if self.gate_next_get.swap(false, Ordering::SeqCst) {
            self.get_started.notify_one();
            self.get_release.notified().await;
        }
        Ok(snapshot)
    }

    async fn put(&self, record: &CountdownRecord) -> PortResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(PortError::StoreUnavailable("disk full".into()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryContentStore {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    pub writes: AtomicUsize,
    pub fail_write: AtomicBool,
}

impl MemoryContentStore {
    pub fn contains(&self, artifact: &ArtifactRef) -> bool {
        self.blobs.lock().unwrap().contains_key(artifact.as_str())
    }

    pub fn seed(&self, name: &str) {
        self.blobs
            .lock()
            .unwrap()
            .insert(name.to_string(), b"old".to_vec());
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn write(&self, bytes: Vec<u8>) -> PortResult<ArtifactRef> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(PortError::StoreUnavailable("cache dir missing".into()));
        }
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("blob-{n}.png");
        self.blobs.lock().unwrap().insert(name.clone(), bytes);
        Ok(ArtifactRef::new(name))
    }

    fn resolve(&self, artifact: &ArtifactRef) -> PortResult<PathBuf> {
        Ok(PathBuf::from("/cache").join(artifact.as_str()))
    }

    async fn remove(&self, artifact: &ArtifactRef) -> PortResult<()> {
        self.blobs.lock().unwrap().remove(artifact.as_str());
        Ok(())
    }
}

/// A completion service that replies with a fixed answer or fails.
pub struct ScriptedCompletion {
    reply: Mutex<Result<String, String>>,
    pub instructions: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(text.to_string())),
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Mutex::new(Err("connection refused".to_string())),
            instructions: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompletionService for ScriptedCompletion {
    async fn complete(&self, instruction: &str) -> PortResult<String> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(PortError::PromptSynthesisFailed)
    }
}

/// An image service that records prompts and returns fixed bytes, fails, or
/// blocks until released.
#[derive(Default)]
pub struct ScriptedImages {
    pub prompts: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub empty: AtomicBool,
    pub gated: AtomicBool,
    pub started: Notify,
    pub release: Notify,
}

impl ScriptedImages {
    pub fn failing() -> Self {
        let images = Self::default();
        images.fail.store(true, Ordering::SeqCst);
        images
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageGenerationService for ScriptedImages {
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.gated.load(Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::GenerationFailed("HTTP 503".into()));
        }
        if self.empty.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}
