//! Shared fixtures and mock backends for the workflow tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use guides_blob::{BlobError, ObjectStore, StoredObject};
use guides_blob_memory::MemoryObjectStore;
use guides_core::{Guide, GuideUpdate, Step, UploadedFile};
use guides_store::{GuideStore, StoreError};
use guides_store_memory::MemoryGuideStore;

use crate::context::{EditContext, EditorServices};

pub const BASE_URL: &str = "https://cdn.example.com/guides";

pub fn seeded_guide() -> Guide {
    Guide {
        id: "g-1".into(),
        user_id: "alice".into(),
        title: "Bread".into(),
        description: "How to bake bread".into(),
        image: "alice_cover.png".into(),
        steps: vec![
            Step::new("Mix", "Mix flour and water", "step-1_a.png"),
            Step::new("Bake", "Bake for 40 minutes", ""),
        ],
    }
}

pub fn png(name: &str) -> UploadedFile {
    UploadedFile::new(name, "image/png", Bytes::from_static(b"\x89PNG"))
}

pub fn context(guide: Guide, objects: MemoryObjectStore) -> EditContext {
    context_with(
        Arc::new(MemoryGuideStore::with_guides([guide])),
        Arc::new(objects),
    )
}

pub fn context_with(guides: Arc<dyn GuideStore>, objects: Arc<dyn ObjectStore>) -> EditContext {
    EditContext::new(EditorServices::new(guides, objects), "alice")
}

/// Record store that counts updates and can be told to fail them.
pub struct RecordingGuideStore {
    inner: MemoryGuideStore,
    fail_with: Option<String>,
    pub updates: AtomicUsize,
}

impl RecordingGuideStore {
    pub fn new(guide: Guide) -> Self {
        Self {
            inner: MemoryGuideStore::with_guides([guide]),
            fail_with: None,
            updates: AtomicUsize::new(0),
        }
    }

    pub fn failing(guide: Guide, message: &str) -> Self {
        Self {
            fail_with: Some(message.to_owned()),
            ..Self::new(guide)
        }
    }
}

#[async_trait]
impl GuideStore for RecordingGuideStore {
    async fn fetch(&self, id: &str) -> Result<Guide, StoreError> {
        self.inner.fetch(id).await
    }

    async fn update(&self, id: &str, update: &GuideUpdate) -> Result<bool, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => self.inner.update(id, update).await,
        }
    }
}

type KeyPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Object store that counts uploads, tracks how many run at once, and can
/// delay or fail selected keys.
pub struct ScriptedObjectStore {
    inner: MemoryObjectStore,
    fail: Option<KeyPredicate>,
    reverse_delays: bool,
    in_flight: AtomicUsize,
    pub uploads: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Default for ScriptedObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedObjectStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryObjectStore::new(BASE_URL),
            fail: None,
            reverse_delays: false,
            in_flight: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail uploads whose key matches.
    pub fn failing_keys(
        mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail = Some(Box::new(predicate));
        self
    }

    /// Make higher step positions finish sooner than lower ones.
    pub fn with_reverse_delays(mut self) -> Self {
        self.reverse_delays = true;
        self
    }

    fn delay_for(&self, key: &str) -> Duration {
        if !self.reverse_delays {
            return Duration::ZERO;
        }
        let position = key
            .strip_prefix("step-")
            .and_then(|rest| rest.split('_').next())
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
        Duration::from_millis(60_u64.saturating_sub(position * 10))
    }
}

#[async_trait]
impl ObjectStore for ScriptedObjectStore {
    fn public_url(&self, key: &str) -> Result<String, BlobError> {
        self.inner.public_url(key)
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BlobError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay_for(key)).await;
        let result = if self.fail.as_ref().is_some_and(|f| f(key)) {
            Err(BlobError::Storage("upload rejected".into()))
        } else {
            self.inner.upload(key, content_type, data).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
