//! Database connection and migrations

use std::path::PathBuf;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use time::OffsetDateTime;

use crate::{Result, StorageError};

const DB_FILE_NAME: &str = "kokodiary.db";

/// Main storage interface. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: SqlitePool,
}

impl Storage {
    /// Open (creating if needed) the database and run migrations.
    ///
    /// `None` uses the platform data directory.
    pub async fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(path = %path.display(), "database ready");

        Ok(Self { pool })
    }

    /// Default database location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        directories::ProjectDirs::from("com", "kokodiary", "kokodiary")
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .ok_or_else(|| {
                StorageError::Other(anyhow::anyhow!("could not determine a data directory"))
            })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Timestamps are stored as unix milliseconds
pub(crate) fn to_millis(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn from_millis(ms: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .map_err(|e| StorageError::Corrupt(format!("timestamp {}: {}", ms, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_open_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.db");

        let storage = Storage::new(Some(path.clone())).await.unwrap();
        assert!(path.is_file());

        // Migrations are idempotent on reopen
        storage.close().await;
        Storage::new(Some(path)).await.unwrap();
    }

    #[test]
    fn test_millis_round_trip() {
        let t = datetime!(2024-03-01 12:34:56.789 UTC);
        assert_eq!(from_millis(to_millis(t)).unwrap(), t);
    }
}
