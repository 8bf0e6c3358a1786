use async_trait::async_trait;

use guides_core::{Guide, GuideUpdate};

use crate::error::StoreError;

/// Trait for reading and overwriting guide records.
///
/// Guides are created and deleted elsewhere; this store only looks rows up by
/// identifier and updates them in place. Implementations must be
/// `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait GuideStore: Send + Sync {
    /// Fetch one guide by identifier.
    ///
    /// Returns [`StoreError::NotFound`] when no row has this identifier.
    async fn fetch(&self, id: &str) -> Result<Guide, StoreError>;

    /// Merge `update` into the guide with this identifier.
    ///
    /// Returns `true` if a row matched. Updating a missing row is not an
    /// error.
    async fn update(&self, id: &str, update: &GuideUpdate) -> Result<bool, StoreError>;
}
