use serde::Deserialize;

/// Configuration for the image object store.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use: `"memory"` or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Bucket holding guide images (required for `s3`).
    pub bucket: Option<String>,

    /// AWS region for the `s3` backend.
    pub region: Option<String>,

    /// Endpoint override for S3-compatible services.
    pub endpoint_url: Option<String>,

    /// Base address of public image URLs.
    pub public_base_url: Option<String>,

    /// Address buckets by path instead of by virtual host.
    #[serde(default)]
    pub force_path_style: bool,

    /// Number of step images uploaded at once.
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: None,
            region: None,
            endpoint_url: None,
            public_base_url: None,
            force_path_style: false,
            max_concurrent_uploads: default_max_concurrent_uploads(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_max_concurrent_uploads() -> usize {
    guides_editor::context::DEFAULT_MAX_CONCURRENT_UPLOADS
}
