use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, error, info, instrument};

use guides_blob::url::validate_key;
use guides_blob::{BlobError, ObjectStore, PublicUrls, StoredObject};

use crate::config::S3StoreConfig;
use crate::error::classify_sdk_error;

/// Build an S3 client from the standard AWS environment credential chain,
/// applying the configured region and endpoint override.
pub async fn build_client(config: &S3StoreConfig) -> aws_sdk_s3::Client {
    let mut loader = aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom S3 endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.force_path_style)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

/// [`ObjectStore`] backed by an S3 bucket.
pub struct S3ObjectStore {
    config: S3StoreConfig,
    client: aws_sdk_s3::Client,
    urls: PublicUrls,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    /// Create a store by building an AWS SDK client.
    pub async fn new(config: S3StoreConfig) -> Self {
        let client = build_client(&config).await;
        Self::with_client(config, client)
    }

    /// Create a store with a pre-built client.
    pub fn with_client(config: S3StoreConfig, client: aws_sdk_s3::Client) -> Self {
        let urls = PublicUrls::new(config.resolved_public_base_url());
        Self {
            config,
            client,
            urls,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn public_url(&self, key: &str) -> Result<String, BlobError> {
        self.urls.url_for(key)
    }

    #[instrument(skip(self, data), fields(bucket = %self.config.bucket, size = data.len()))]
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, BlobError> {
        validate_key(key)?;
        let size_bytes = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "S3 put_object failed");
                classify_sdk_error(key, &err_str)
            })?;

        info!(key, "object uploaded");
        Ok(StoredObject {
            path: key.to_owned(),
            content_type: content_type.to_owned(),
            size_bytes,
        })
    }
}
