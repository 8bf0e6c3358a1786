use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use guides_blob::url::validate_key;
use guides_blob::{BlobError, ObjectStore, PublicUrls, StoredObject};

/// Default public base used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/objects";

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub content_type: String,
    pub data: Bytes,
}

/// In-memory [`ObjectStore`] backed by a [`DashMap`].
///
/// Useful for development and tests. Objects are lost when the store is
/// dropped.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: DashMap<String, MemoryObject>,
    urls: PublicUrls,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MemoryObjectStore {
    /// Create an empty store whose public URLs live under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            urls: PublicUrls::new(base_url),
        }
    }

    /// Fetch a stored object by key.
    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn public_url(&self, key: &str) -> Result<String, BlobError> {
        self.urls.url_for(key)
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BlobError> {
        validate_key(key)?;
        let size_bytes = data.len() as u64;
        match self.objects.entry(key.to_owned()) {
            Entry::Occupied(_) => Err(BlobError::AlreadyExists(key.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(MemoryObject {
                    content_type: content_type.to_owned(),
                    data,
                });
                debug!(key, size_bytes, "object stored in memory");
                Ok(StoredObject {
                    path: key.to_owned(),
                    content_type: content_type.to_owned(),
                    size_bytes,
                })
            }
        }
    }
}
