use std::sync::Arc;

use guides_core::Guide;
use guides_store::GuideStore;
use guides_store_memory::MemoryGuideStore;
#[cfg(feature = "postgres")]
use guides_store_postgres::{PostgresConfig, PostgresGuideStore};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Construct the guide record store from configuration.
pub async fn create_guide_store(config: &StoreConfig) -> Result<Arc<dyn GuideStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => create_memory(config),
        #[cfg(feature = "postgres")]
        "postgres" => create_postgres(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported store backend: {other} (is the feature enabled?)"
        ))),
    }
}

fn create_memory(config: &StoreConfig) -> Result<Arc<dyn GuideStore>, ServerError> {
    let Some(path) = &config.seed_file else {
        return Ok(Arc::new(MemoryGuideStore::new()));
    };
    let contents = std::fs::read_to_string(path)?;
    let guides: Vec<Guide> = serde_json::from_str(&contents)
        .map_err(|e| ServerError::Config(format!("invalid seed file {path}: {e}")))?;
    info!(path = %path, guides = guides.len(), "memory store seeded");
    Ok(Arc::new(MemoryGuideStore::with_guides(guides)))
}

#[cfg(feature = "postgres")]
fn postgres_config(config: &StoreConfig) -> Result<PostgresConfig, ServerError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| ServerError::Config("postgres backend requires 'url' in [store]".into()))?;
    let defaults = PostgresConfig::default();
    Ok(PostgresConfig {
        url: url.to_owned(),
        pool_size: config.pool_size.unwrap_or(defaults.pool_size),
        schema: config.schema.clone().unwrap_or(defaults.schema),
        table: config.table.clone().unwrap_or(defaults.table),
        ssl_mode: config.ssl_mode.clone(),
        ssl_root_cert: config.ssl_root_cert.clone(),
    })
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &StoreConfig) -> Result<Arc<dyn GuideStore>, ServerError> {
    let store = PostgresGuideStore::new(postgres_config(config)?)
        .await
        .map_err(|e| ServerError::Config(format!("postgres store: {e}")))?;
    Ok(Arc::new(store))
}
