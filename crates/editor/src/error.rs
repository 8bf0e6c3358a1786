use guides_blob::BlobError;
use guides_store::StoreError;
use thiserror::Error;

/// Message flashed when the guide cannot be read.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching guide, please try again later.";

/// Message flashed when a stored image key cannot be turned into a URL.
pub const RESOLVE_FAILED_MESSAGE: &str = "Error resolving guide images, please try again later.";

/// Failures of the edit workflow. Each aborts the request with a server
/// error.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("failed to fetch guide: {0}")]
    Fetch(#[source] StoreError),

    #[error("failed to resolve image URL: {0}")]
    ResolveImage(#[source] BlobError),

    #[error("cover image upload failed: {0}")]
    CoverUpload(#[source] BlobError),

    #[error("image upload for step {position} failed: {source}")]
    StepUpload {
        /// 1-based step position.
        position: usize,
        #[source]
        source: BlobError,
    },

    #[error("failed to update guide: {0}")]
    Persist(#[source] StoreError),
}

impl EditError {
    /// The message shown to the user.
    ///
    /// Read failures get a fixed message; write failures surface the
    /// backend's own message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(_) => FETCH_FAILED_MESSAGE.to_owned(),
            Self::ResolveImage(_) => RESOLVE_FAILED_MESSAGE.to_owned(),
            Self::CoverUpload(e) | Self::StepUpload { source: e, .. } => e.to_string(),
            Self::Persist(e) => e.to_string(),
        }
    }
}
