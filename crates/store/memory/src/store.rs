use async_trait::async_trait;
use dashmap::DashMap;

use guides_core::{Guide, GuideUpdate};
use guides_store::error::StoreError;
use guides_store::store::GuideStore;

/// In-memory [`GuideStore`] backed by a [`DashMap`].
///
/// Guides are seeded with [`insert`](Self::insert); the trait only reads and
/// updates them.
#[derive(Debug, Default)]
pub struct MemoryGuideStore {
    guides: DashMap<String, Guide>,
}

impl MemoryGuideStore {
    /// Create a new, empty in-memory guide store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given guides.
    pub fn with_guides(guides: impl IntoIterator<Item = Guide>) -> Self {
        let store = Self::new();
        for guide in guides {
            store.insert(guide);
        }
        store
    }

    /// Insert or replace a guide, keyed by its identifier.
    pub fn insert(&self, guide: Guide) {
        self.guides.insert(guide.id.clone(), guide);
    }

    /// Number of stored guides.
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

#[async_trait]
impl GuideStore for MemoryGuideStore {
    async fn fetch(&self, id: &str) -> Result<Guide, StoreError> {
        self.guides
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    async fn update(&self, id: &str, update: &GuideUpdate) -> Result<bool, StoreError> {
        match self.guides.get_mut(id) {
            Some(mut entry) => {
                entry.apply(update.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
