use serde::{Deserialize, Serialize};

/// Configuration for the S3 object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3StoreConfig {
    /// AWS region (e.g. `"us-east-1"`).
    #[serde(default = "default_region")]
    pub region: String,

    /// Bucket holding guide images.
    pub bucket: String,

    /// Endpoint override for S3-compatible services.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Base address of public object URLs. Derived from the endpoint or the
    /// region when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Address buckets by path instead of by virtual host.
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

impl S3StoreConfig {
    /// Create a config for `bucket` in the default region.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            region: default_region(),
            bucket: bucket.into(),
            endpoint_url: None,
            public_base_url: None,
            force_path_style: false,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the endpoint URL override (for `MinIO` or `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    #[must_use]
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    /// Base address of public object URLs.
    ///
    /// Uses `public_base_url` when set, otherwise `{endpoint}/{bucket}` for
    /// custom endpoints and the virtual-hosted AWS address for plain S3.
    pub fn resolved_public_base_url(&self) -> String {
        if let Some(base) = &self.public_base_url {
            return base.clone();
        }
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}
