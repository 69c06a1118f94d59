use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

// ============================================================================
// Database
// ============================================================================

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InstanceLocked` if another process has the
    /// database locked (SQLITE_BUSY, SQLITE_LOCKED, SQLITE_CANTOPEN).
    /// Returns `DatabaseError::Other` for other database errors.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: SQLite waits up to 5 seconds for locks to release
        // before returning SQLITE_BUSY. Handles transient contention between a
        // page commit and concurrent viewed/liked toggles automatically.
        // Using pragma() ensures all connections in the pool inherit this setting.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .pragma("busy_timeout", "5000");
        // SQLite is single-writer; 5 connections covers peak concurrent readers
        // (feed window + history/liked views while a page load is in flight).
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        let db = Self { pool };
        db.migrate().await.map_err(|e| {
            // Migration errors could also be lock-related
            let error_string = e.to_string().to_lowercase();
            if error_string.contains("database is locked")
                || error_string.contains("database table is locked")
                || error_string.contains("sqlite_busy")
                || error_string.contains("sqlite_locked")
            {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(e.to_string())
            }
        })?;
        Ok(db)
    }

    /// Run database migrations atomically within a transaction.
    ///
    /// All schema changes are wrapped in a single transaction so a failure
    /// (disk full, power loss) rolls back to the previous consistent state.
    /// All statements use `IF NOT EXISTS`, so re-running is a no-op.
    async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Article cache. `url` carries no UNIQUE constraint: the endless feed
        // deliberately re-inserts the same remote article across synthetic
        // pages under fresh surrogate ids.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                body TEXT,
                image_url TEXT,
                published_at TEXT,
                source_name TEXT,
                source_origin TEXT,
                layout_kind TEXT NOT NULL DEFAULT 'standard',
                gallery_images TEXT NOT NULL DEFAULT '',
                is_viewed INTEGER NOT NULL DEFAULT 0,
                viewed_at INTEGER,
                is_liked INTEGER NOT NULL DEFAULT 0,
                inserted_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // inserted_at is the sole feed ordering key
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_inserted ON articles(inserted_at)")
            .execute(&mut *tx)
            .await?;

        // Viewed/liked toggles and liked-url capture match rows by url
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(url)")
            .execute(&mut *tx)
            .await?;

        // Partial index covering the liked view (is_liked = 1, newest first)
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_articles_liked ON articles(inserted_at DESC) WHERE is_liked = 1",
        )
        .execute(&mut *tx)
        .await?;

        // Partial index covering the viewed history (is_viewed = 1 by viewed_at DESC)
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_articles_viewed ON articles(viewed_at DESC) WHERE is_viewed = 1",
        )
        .execute(&mut *tx)
        .await?;

        // Key-value store for user settings (channel selection lives here).
        // Keys use dotted convention: channels.mine, session.channel, etc.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Database;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open(":memory:").await.unwrap();
        let count = db.count_articles().await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        // Open already migrated once; IF NOT EXISTS must make re-runs a no-op
        let db = Database::open(":memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
    }
}
