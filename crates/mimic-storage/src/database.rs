// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All statements run on `tokio-rusqlite`'s single background thread, so the
//! [`Database`] handle is the only writer.

use std::path::Path;

use mimic_core::MimicError;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

/// Convert a `tokio-rusqlite` error into [`MimicError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error) -> MimicError {
    MimicError::Storage {
        source: Box::new(e),
    }
}

/// An open, migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, MimicError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MimicError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        let db = Self::prepare(conn, wal_mode).await?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, MimicError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: Connection, wal_mode: bool) -> Result<Self, MimicError> {
        let journal = if wal_mode { "WAL" } else { "DELETE" };
        let applied = conn
            .call(move |conn| {
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode = {journal};
                     PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;"
                ))?;
                Ok(crate::migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
            .map_err(|e| MimicError::Storage {
                source: Box::new(e),
            })?;

        if applied > 0 {
            debug!(applied, "applied database migrations");
        }
        Ok(Self { conn })
    }

    /// The shared connection handle. Clones refer to the same background thread.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), MimicError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Runs `SELECT 1` to prove the connection is alive.
    pub async fn ping(&self) -> Result<(), MimicError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().await.unwrap();
        let names = table_names(&db).await;
        assert!(names.contains(&"examples".to_string()));
        assert!(names.contains(&"phrases".to_string()));
        assert!(names.contains(&"store_meta".to_string()));
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("mimic.db");
        let db = Database::open(&path, true).await.unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn reopening_does_not_reapply_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mimic.db");

        let db = Database::open(&path, true).await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES ('embedding_model', 'test')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        db.checkpoint().await.unwrap();
        drop(db);

        let db = Database::open(&path, true).await.unwrap();
        let value: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM store_meta WHERE key = 'embedding_model'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(value, "test");
    }
}
