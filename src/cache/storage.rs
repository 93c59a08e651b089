//! Durable key-value storage for fallback records
//!
//! The fallback layer only needs get/set/remove/clear over string keys and
//! JSON text. `SqliteStore` keeps that in a single SQLite table under the
//! user's cache directory; `MemoryStore` is the in-process stand-in used for
//! `--no-cache` runs and tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

type Result<T> = std::result::Result<T, CacheError>;

/// String-keyed durable storage. Values are JSON text.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether an entry was removed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Removes every entry; returns how many were removed.
    fn clear(&self) -> Result<usize>;
}

/// SQLite-backed key-value store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store at the default XDG cache location
    pub fn open() -> Result<Self> {
        let cache_dir = Self::cache_dir()?;
        Self::open_at(&cache_dir)
    }

    /// Get the cache directory path (~/.cache/bugmart on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("bugmart"))
    }

    /// Open the store in a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("cache.db");
        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                stored_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn();

        let (entries, total_size, oldest, newest): (i64, i64, Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0), MIN(stored_at), MAX(stored_at)
                 FROM kv_entries",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )?;

        Ok(StoreStats {
            entries: entries as usize,
            total_size_bytes: total_size as usize,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.conn().execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, stored_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, now, value.len()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM kv_entries WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    fn clear(&self) -> Result<usize> {
        let deleted = self.conn().execute("DELETE FROM kv_entries", [])?;
        Ok(deleted)
    }
}

/// Statistics about the durable store
#[derive(Debug)]
pub struct StoreStats {
    pub entries: usize,
    pub total_size_bytes: usize,
    /// Milliseconds since the Unix epoch
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

/// In-process key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    max_value_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes of values larger than `max_value_bytes`, like a
    /// browser storage quota would.
    pub fn with_quota(max_value_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_value_bytes: Some(max_value_bytes),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(max) = self.max_value_bytes
            && value.len() > max
        {
            return Err(CacheError::WriteRejected(format!(
                "{} bytes exceeds quota of {} bytes",
                value.len(),
                max
            )));
        }
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries().remove(key).is_some())
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}
