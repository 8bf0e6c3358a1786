use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The key cannot address an object (empty, contains `/`, ...).
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    /// An object already exists under this key.
    #[error("the resource already exists: {0}")]
    AlreadyExists(String),

    /// A storage backend error occurred.
    #[error("object storage error: {0}")]
    Storage(String),
}
