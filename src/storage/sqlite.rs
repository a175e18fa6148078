//! SQLite-backed key-value store.
//!
//! One table, one row per key. Each write runs in its own transaction and
//! checks the optional quota before committing, so a refused write leaves
//! the stored value untouched.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, trace};

use super::KeyValueStore;
use crate::error::{GalleryError, Result};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Durable key-value store in a single SQLite file.
pub struct SqliteStore {
    conn: Connection,
    quota_bytes: Option<u64>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .field("quota_bytes", &self.quota_bytes)
            .finish()
    }
}

impl SqliteStore {
    /// Opens or creates a store at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GalleryError::StorageFailure(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Opening gallery database");
        let conn = Connection::open(path)
            .map_err(|e| GalleryError::StorageFailure(format!("Failed to open database: {e}")))?;

        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Gallery database ready");
        Ok(store)
    }

    /// Creates an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            GalleryError::StorageFailure(format!("Failed to create in-memory database: {e}"))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL).map_err(|e| {
            GalleryError::StorageFailure(format!("Failed to initialize schema: {e}"))
        })?;
        Ok(Self {
            conn,
            quota_bytes: None,
        })
    }

    /// Limit the total size of all keys and values, in bytes.
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let tx = self.conn.transaction()?;

        if let Some(quota) = self.quota_bytes {
            let others: i64 = tx.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM kv WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )?;
            let needed = u64::try_from(others).unwrap_or(0) + (key.len() + value.len()) as u64;
            if needed > quota {
                debug!(needed, quota, "Write refused: quota exceeded");
                // Dropping the transaction rolls it back.
                return Err(GalleryError::StorageFailure(format!(
                    "quota exceeded: {needed} of {quota} bytes"
                )));
            }
        }

        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tx.commit()?;
        trace!("Write committed");
        Ok(())
    }
}

/// Returns the default database path.
pub fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or_else(|| GalleryError::ConfigInvalid("Could not determine data directory".to_string()))?;
    Ok(base.join("gallery").join("gallery.db"))
}
