use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL pool and checks that the `results` table is reachable.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("could not connect to PostgreSQL")?;

    sqlx::query("SELECT 1 FROM results LIMIT 1")
        .execute(&pool)
        .await
        .context("`results` table is not readable")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
