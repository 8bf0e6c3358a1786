use guides_blob::BlobError;

/// Map an S3 SDK error message onto a [`BlobError`].
///
/// A failed `If-None-Match` precondition means the key is already taken.
pub fn classify_sdk_error(key: &str, error_str: &str) -> BlobError {
    let lower = error_str.to_lowercase();
    if lower.contains("preconditionfailed") || lower.contains("precondition failed") {
        BlobError::AlreadyExists(key.to_owned())
    } else if lower.contains("entitytoolarge") {
        BlobError::Storage(format!("object rejected as too large: {error_str}"))
    } else {
        BlobError::Storage(error_str.to_owned())
    }
}
