use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

/// Creates the SQLite connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}...");

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{database_url}'"))?;

    run_migrations(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// must never open a second one or drop the first.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}
