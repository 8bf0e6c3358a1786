use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;
use crate::types::StoredObject;

/// Object storage for guide images, scoped to a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Public URL under which the object with this key can be fetched.
    ///
    /// This does not contact the backend and does not check that the object
    /// exists. Returns [`BlobError::InvalidKey`] for keys that cannot
    /// address an object.
    fn public_url(&self, key: &str) -> Result<String, BlobError>;

    /// Store `data` under `key` and return the stored path.
    ///
    /// Existing objects are not overwritten.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BlobError>;
}
