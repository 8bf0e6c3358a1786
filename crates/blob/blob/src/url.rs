use guides_core::{encode_key_segment, is_valid_key};

use crate::error::BlobError;

/// Builds public URLs for objects under a fixed base address.
///
/// Keys are single path segments: the URL is `{base_url}/{encoded key}`, so
/// the key can be recovered with [`guides_core::key_from_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    base_url: String,
}

impl PublicUrls {
    /// Create a builder for the given base address. Trailing slashes are
    /// ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL for `key`.
    pub fn url_for(&self, key: &str) -> Result<String, BlobError> {
        validate_key(key)?;
        Ok(format!("{}/{}", self.base_url, encode_key_segment(key)))
    }
}

/// Reject keys that cannot be a single object name.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(BlobError::InvalidKey(key.to_owned()))
    }
}
