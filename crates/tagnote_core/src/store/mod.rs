//! Durable key-value persistence for application state.
//!
//! # Responsibility
//! - Define the backing-store seam (`KeyValueBackend`) and its in-memory and
//!   SQLite implementations.
//! - Provide `PersistedStore<T>`, the generic cell every collection is kept in.
//!
//! # Invariants
//! - Every successful `PersistedStore::set` is written to the backend before
//!   the new value becomes observable in memory.
//! - A corrupt stored payload never produces a partially decoded value.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod backend;
mod persisted;
mod sqlite;

pub use backend::{KeyValueBackend, MemoryBackend};
pub use persisted::{InitialValue, PersistedStore, SubscriptionId};
pub use sqlite::SqliteBackend;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by backing stores and persisted cells.
#[derive(Debug)]
pub enum StoreError {
    /// Backend-specific failure that is not a SQLite error.
    Backend(String),
    Db(DbError),
    /// Stored payload exists but cannot be decoded into the expected type.
    Deserialization { key: String, message: String },
    Serialization { key: String, message: String },
}

impl StoreError {
    /// Returns whether this error reports a corrupt or incompatible payload.
    pub fn is_deserialization(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "backing store failure: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Deserialization { key, message } => {
                write!(f, "stored value for `{key}` cannot be decoded: {message}")
            }
            Self::Serialization { key, message } => {
                write!(f, "value for `{key}` cannot be encoded: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
