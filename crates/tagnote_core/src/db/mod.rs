//! SQLite file layout behind `store::SqliteBackend`.
//!
//! The database holds a single `kv_entries` table. Each persisted collection
//! (`NOTES`, `TAGS`) is one row whose `value` column stores the JSON text
//! produced by `PersistedStore`; SQLite never looks inside it.
//!
//! # Invariants
//! - At most one row per key; writers upsert.
//! - Schema version lives in `PRAGMA user_version` and only moves forward.
//! - A file written by a newer build is refused instead of downgraded.
//! - Connections are handed out only after every migration committed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file carries a schema version this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
    /// A migration script failed; the transaction was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "note database uses schema v{found}, this build reads up to v{supported}"
            ),
            Self::Migration { version, source } => {
                write!(f, "kv schema migration v{version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
