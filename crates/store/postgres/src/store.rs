use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use guides_core::{Guide, GuideUpdate, Step};
use guides_store::error::StoreError;
use guides_store::store::GuideStore;

use crate::config::PostgresConfig;
use crate::migrations;

/// Row shape returned by the guide lookup; steps come back as JSON text.
type GuideRow = (String, String, String, String, String, String);

/// Build `PgConnectOptions` from a [`PostgresConfig`], applying SSL settings
/// when configured.
pub(crate) fn build_connect_options(
    config: &PostgresConfig,
) -> Result<sqlx::postgres::PgConnectOptions, StoreError> {
    let mut options: sqlx::postgres::PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| StoreError::Connection(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => sqlx::postgres::PgSslMode::Disable,
            "prefer" => sqlx::postgres::PgSslMode::Prefer,
            "require" => sqlx::postgres::PgSslMode::Require,
            "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
            "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
            other => {
                return Err(StoreError::Connection(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// PostgreSQL-backed implementation of [`GuideStore`].
///
/// Uses `sqlx::PgPool` for connection pooling. Steps live in a JSONB column
/// and are (de)serialized with `serde_json`.
pub struct PostgresGuideStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresGuideStore {
    /// Connect to `PostgreSQL`, create the pool and run migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if pool creation fails, or
    /// [`StoreError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StoreError> {
        let connect_options = build_connect_options(&config)?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a store from an existing pool. Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_steps(raw: &str) -> Result<Vec<Step>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl GuideStore for PostgresGuideStore {
    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn fetch(&self, id: &str) -> Result<Guide, StoreError> {
        let table = self.config.guides_table();
        let query = format!(
            "SELECT id, user_id, title, description, image, steps::text \
             FROM {table} WHERE id = $1"
        );

        let row: Option<GuideRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let (id, user_id, title, description, image, steps) =
            row.ok_or_else(|| StoreError::NotFound(id.to_owned()))?;

        Ok(Guide {
            id,
            user_id,
            title,
            description,
            image,
            steps: decode_steps(&steps)?,
        })
    }

    #[instrument(
        skip(self, update),
        fields(table = %self.config.table, steps = update.steps.len())
    )]
    async fn update(&self, id: &str, update: &GuideUpdate) -> Result<bool, StoreError> {
        let table = self.config.guides_table();
        let steps = serde_json::to_string(&update.steps)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let query = format!(
            "UPDATE {table} \
             SET user_id = $2, title = $3, description = $4, image = $5, \
                 steps = $6::jsonb, updated_at = NOW() \
             WHERE id = $1"
        );

        let result = sqlx::query(&query)
            .bind(id)
            .bind(&update.user_id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(&update.image)
            .bind(steps)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(rows = result.rows_affected(), "guide update executed");
        Ok(result.rows_affected() > 0)
    }
}
