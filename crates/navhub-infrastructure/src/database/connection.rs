//! Database connection pool

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use navhub_shared::config::DatabaseSettings;

pub async fn create_pool(url: &str, max_connections: u32, acquire_timeout_secs: u64) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(url)
        .await
}

/// Applies the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Opens a pool for `settings` and brings the schema up to date.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let url = settings
        .url
        .as_deref()
        .context("database.url is required for the postgres backend")?;

    let pool = create_pool(url, settings.max_connections, settings.acquire_timeout_secs)
        .await
        .context("failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    info!(max_connections = settings.max_connections, "PostgreSQL pool ready");
    Ok(pool)
}
