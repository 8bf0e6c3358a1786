use std::fmt;

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters left as-is when a key is placed in a URL path segment
/// (RFC 3986 unreserved set).
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A file supplied by the submitter. Only lives for the duration of a write
/// request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Original file name as sent by the client.
    pub file_name: String,
    /// MIME content type (e.g. `"image/png"`).
    pub content_type: String,
    /// Raw file content. Serialized as base64 so a failed submission can be
    /// handed back to the client and resubmitted unchanged.
    #[serde(with = "base64_bytes")]
    pub data: Bytes,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Extension of the file name (text after the last `.`), if any.
    pub fn extension(&self) -> Option<&str> {
        file_extension(&self.file_name)
    }
}

/// The image attached to a guide or step in a form.
///
/// A form image is either absent, a freshly uploaded file, or a reference to
/// an image that is already stored (by its public URL). The variants make the
/// "file XOR URL" rule unrepresentable to break.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageField {
    /// No image.
    #[default]
    None,
    /// A new file to upload.
    Upload(UploadedFile),
    /// An image already in the object store, addressed by its public URL.
    Existing {
        /// Public URL of the stored image.
        url: String,
    },
}

impl ImageField {
    /// Build a field from an optional public URL.
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.is_empty() => Self::Existing { url },
            _ => Self::None,
        }
    }

    /// Returns `true` if the field carries a file to upload.
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    /// Drop an uploaded file, leaving the field empty. URLs are kept.
    #[must_use]
    pub fn without_file(self) -> Self {
        match self {
            Self::Upload(_) => Self::None,
            other => other,
        }
    }
}

/// Who a freshly uploaded object belongs to; decides the key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope<'a> {
    /// Cover image of a guide, scoped to the acting user.
    Owner(&'a str),
    /// Image of the step at this 1-based position.
    Step(usize),
}

impl fmt::Display for KeyScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner(user_id) => write!(f, "{user_id}"),
            Self::Step(position) => write!(f, "step-{position}"),
        }
    }
}

/// Build an object key: `{scope}_{id}.{ext}`, or `{scope}_{id}` when the
/// file name has no extension.
pub fn object_key(scope: KeyScope<'_>, file_name: &str, id: Uuid) -> String {
    match file_extension(file_name) {
        Some(ext) => format!("{scope}_{id}.{ext}"),
        None => format!("{scope}_{id}"),
    }
}

/// Build an object key with a freshly generated random identifier.
pub fn new_object_key(scope: KeyScope<'_>, file_name: &str) -> String {
    object_key(scope, file_name, Uuid::new_v4())
}

/// Text after the last `.` of a file name. A leading dot alone (`.env`) or a
/// trailing dot does not count as an extension.
pub fn file_extension(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Encode a stored key for use as the last segment of a public URL.
pub fn encode_key_segment(key: &str) -> String {
    utf8_percent_encode(key, KEY_SEGMENT).to_string()
}

/// Recover the stored key from a public URL: the last `/`-delimited path
/// segment, with query and fragment removed and percent-escapes decoded.
///
/// This is the inverse of placing [`encode_key_segment`] output at the end of
/// a URL.
pub fn key_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Whether `key` names a single object: not empty, not `.` or `..`, and free
/// of `/` and control characters.
pub fn is_valid_key(key: &str) -> bool {
    !(key.is_empty()
        || key == "."
        || key == ".."
        || key.contains('/')
        || key.chars().any(char::is_control))
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
