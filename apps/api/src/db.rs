use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the aura-api Postgres pool. Migrations are applied by the caller.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!(service = "aura-api", max_connections = MAX_CONNECTIONS, "Connecting to Postgres");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .context("aura-api could not reach Postgres")?;

    info!(service = "aura-api", "Postgres pool ready");
    Ok(pool)
}
