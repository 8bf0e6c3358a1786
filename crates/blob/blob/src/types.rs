use serde::{Deserialize, Serialize};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Path of the object inside the bucket. This is the key persisted on
    /// guide records.
    pub path: String,
    /// MIME content type recorded with the object.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
}
