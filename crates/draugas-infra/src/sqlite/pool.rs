//! SQLite connection pools for the user store.
//!
//! Writes go through a single connection; reads fan out over a small
//! read-only pool. The file runs in WAL mode so readers never block the writer.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// File name of the user store inside the data directory.
pub const DATABASE_FILE: &str = "draugas.db";

const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader and writer pools over the same database file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Connect to `database_url` and bring the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // The reader pool opens read-only, so the file and schema must exist first.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(%database_url, "Database pools ready");
        Ok(Self { reader, writer })
    }

    /// Open (creating if needed) the store inside `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::new(&database_url(data_dir)).await
    }

    /// Close both pools, waiting for in-flight queries.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}

/// Database URL for the user store inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}/{DATABASE_FILE}", data_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_open_creates_user_table() {
        let (dir, pool) = temp_pool().await;
        assert!(dir.path().join(DATABASE_FILE).exists());

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations'",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        assert_eq!(tables, vec![("users".to_string(),)]);
    }

    #[tokio::test]
    async fn test_writer_uses_wal() {
        let (_dir, pool) = temp_pool().await;
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_reader_rejects_writes() {
        let (_dir, pool) = temp_pool().await;
        let result = sqlx::query("DELETE FROM users").execute(&pool.reader).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reopen_keeps_schema() {
        let (dir, pool) = temp_pool().await;
        pool.close().await;
        assert!(pool.writer.is_closed());

        let reopened = DatabasePool::open(dir.path()).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&reopened.reader)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_database_url() {
        let url = database_url(Path::new("/tmp/draugas"));
        assert_eq!(url, "sqlite:///tmp/draugas/draugas.db");
    }
}
