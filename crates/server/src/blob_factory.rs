use std::sync::Arc;

use guides_blob::ObjectStore;
use guides_blob_memory::{DEFAULT_BASE_URL, MemoryObjectStore};
#[cfg(feature = "s3")]
use guides_blob_s3::{S3ObjectStore, S3StoreConfig};

use crate::config::StorageConfig;
use crate::error::ServerError;

/// Construct the image object store from configuration.
pub async fn create_object_store(
    config: &StorageConfig,
) -> Result<Arc<dyn ObjectStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryObjectStore::new(
            config
                .public_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        ))),
        #[cfg(feature = "s3")]
        "s3" => create_s3(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported storage backend: {other} (is the feature enabled?)"
        ))),
    }
}

#[cfg(feature = "s3")]
async fn create_s3(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, ServerError> {
    let bucket = config
        .bucket
        .as_deref()
        .ok_or_else(|| ServerError::Config("s3 backend requires 'bucket' in [storage]".into()))?;
    let mut s3_config = S3StoreConfig::new(bucket);
    if let Some(region) = &config.region {
        s3_config = s3_config.with_region(region);
    }
    if let Some(endpoint) = &config.endpoint_url {
        s3_config = s3_config.with_endpoint_url(endpoint);
    }
    if let Some(base) = &config.public_base_url {
        s3_config = s3_config.with_public_base_url(base);
    }
    s3_config.force_path_style = config.force_path_style;
    Ok(Arc::new(S3ObjectStore::new(s3_config).await))
}
