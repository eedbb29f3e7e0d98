//! Database connection pool and migration.

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::schema::SCHEMA_STATEMENTS;

/// Database handle wrapping the SQLite pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `url`, creating the file if needed.
    pub async fn connect(url: &str) -> DbResult<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
            info!("Created database at {}", url);
        }

        let pool = SqlitePoolOptions::new().connect(url).await?;
        Ok(Self { pool })
    }

    /// Connect using the `DATABASE_URL` environment variable.
    pub async fn from_env() -> DbResult<Self> {
        let url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://bais.db".to_string());
        Self::connect(&url).await
    }

    /// In-memory database for tests.
    ///
    /// A single connection is required: every connection to
    /// `sqlite::memory:` gets its own database.
    pub async fn in_memory() -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Apply the embedded schema.
    pub async fn migrate(&self) -> DbResult<()> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(e.to_string()))?;
        }
        info!("Schema migration complete");
        Ok(())
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity check.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_in_memory() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        // Idempotent
        db.migrate().await.unwrap();
        db.ping().await.unwrap();
    }
}
