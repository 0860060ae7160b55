//! Core domain logic for tagnote.
//! This crate is the single source of truth for note/tag invariants.

pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{load_config, ConfigError, CoreConfig};
pub use filter::list_view::NoteListView;
pub use filter::note_filter::{filter_notes, NoteQuery};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteData, NoteId, SimplifiedNote};
pub use model::tag::{Tag, TagId};
pub use repo::note_repo::{NoteRepository, NOTES_KEY};
pub use repo::tag_repo::{TagRegistry, TAGS_KEY};
pub use repo::{RepoError, RepoResult};
pub use service::notebook::{Notebook, NotebookError, NotebookResult, TagDeletion};
pub use store::{
    InitialValue, KeyValueBackend, MemoryBackend, PersistedStore, SqliteBackend, StoreError,
    StoreResult, SubscriptionId,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
