use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a read-only pool over an existing dataset file.
    ///
    /// The schema is fixed at load time, so a missing table is a startup
    /// error rather than something to migrate.
    pub async fn new(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .read_only(true)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self { pool };
        db.verify_schema().await?;
        info!("SQLite dataset opened read-only at: {}", path);

        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that both dataset tables exist and the file is intact.
    async fn verify_schema(&self) -> Result<()> {
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name IN ('measurement', 'station')",
        )
        .fetch_all(&self.pool)
        .await
        .context("Database connectivity check failed")?;

        for required in ["measurement", "station"] {
            if !tables.iter().any(|(name,)| name == required) {
                return Err(anyhow::anyhow!("Missing required table: {}", required));
            }
        }

        // Page structure integrity
        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "Database integrity check failed: {}",
                result
            ));
        }

        Ok(())
    }
}
