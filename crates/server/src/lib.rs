pub mod api;
pub mod auth;
pub mod blob_factory;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod multipart;
pub mod store_factory;
pub mod telemetry;
