//! SQLite-backed key-value storage.
//!
//! # Invariants
//! - Connections are opened through `db::open_db*`, so `kv_entries` exists.
//! - One row per key; writes are upserts.

use crate::db::{open_db, open_db_in_memory};
use crate::store::{KeyValueBackend, StoreError, StoreResult};
use log::error;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value backend persisting entries in the `kv_entries` table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl KeyValueBackend for SqliteBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|err| {
                error!(
                    "event=kv_write module=store status=error key={} error_code=kv_write_failed error={}",
                    key, err
                );
                StoreError::from(err)
            })?;
        Ok(())
    }
}
