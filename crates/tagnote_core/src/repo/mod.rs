//! Repository layer over persisted collections.
//!
//! # Responsibility
//! - Own the canonical note and tag collections.
//! - Return semantic errors (`NotFound`, `DuplicateId`) distinct from
//!   persistence failures.
//!
//! # Invariants
//! - Each repository is backed by exactly one `PersistedStore` key.
//! - Failed operations never write to the backing store.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;
pub mod tag_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note and tag operations.
#[derive(Debug)]
pub enum RepoError {
    /// No record with the given id exists.
    NotFound(String),
    /// A record with the given id already exists.
    DuplicateId(String),
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
