use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Create the guides table if it does not exist.
///
/// Steps are stored as a JSONB array of `{name, description, image}` objects;
/// their order in the array is the step order.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let guides_table = config.guides_table();

    let create_guides = format!(
        "CREATE TABLE IF NOT EXISTS {guides_table} (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image TEXT NOT NULL DEFAULT '',
            steps JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"
    );

    let create_user_idx = format!(
        "CREATE INDEX IF NOT EXISTS {}_user_id_idx ON {guides_table} (user_id)",
        config.table
    );

    sqlx::query(&create_guides).execute(pool).await?;
    sqlx::query(&create_user_idx).execute(pool).await?;

    Ok(())
}
