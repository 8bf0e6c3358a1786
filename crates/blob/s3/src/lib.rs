//! S3-compatible [`ObjectStore`](guides_blob::ObjectStore) backend.
//!
//! Works against AWS S3 and against S3-compatible services (`MinIO`,
//! `LocalStack`, Supabase storage) through `endpoint_url` and
//! `force_path_style`.

pub mod config;
pub mod error;
pub mod store;

pub use config::S3StoreConfig;
pub use store::S3ObjectStore;
