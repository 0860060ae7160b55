//! Notebook use-case facade.
//!
//! # Responsibility
//! - Open the note and tag stores over one shared backend.
//! - Validate note/tag writes before they reach the repositories.
//! - Serve filtered list projections.
//!
//! # Invariants
//! - Writes through this facade never add a tag id that is missing from the
//!   registry. Ids a note already carries are kept even when the registry
//!   no longer lists them (e.g. after a `TAGS` payload was reset).
//! - Deleting a tag removes its id from every note.
//! - Blank labels are rejected; titles are free-form and may be empty.

use crate::filter::list_view::NoteListView;
use crate::filter::note_filter::{filter_notes, NoteQuery};
use crate::model::note::{Note, NoteData, SimplifiedNote};
use crate::model::tag::{Tag, TagId};
use crate::repo::note_repo::NoteRepository;
use crate::repo::tag_repo::TagRegistry;
use crate::repo::RepoError;
use crate::store::{KeyValueBackend, MemoryBackend, SqliteBackend, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

/// Service error for notebook use-cases.
#[derive(Debug)]
pub enum NotebookError {
    /// Tag label is empty after trimming.
    InvalidLabel(String),
    /// Note data adds a tag id missing from the registry.
    UnknownTag(TagId),
    Repo(RepoError),
}

impl NotebookError {
    /// Returns whether this error is a missing-record lookup failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(RepoError::NotFound(_)))
    }
}

impl Display for NotebookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLabel(value) => write!(f, "invalid tag label: `{value}`"),
            Self::UnknownTag(tag_id) => write!(f, "unknown tag id: {tag_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotebookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotebookError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<StoreError> for NotebookError {
    fn from(value: StoreError) -> Self {
        Self::Repo(RepoError::Store(value))
    }
}

pub type NotebookResult<T> = Result<T, NotebookError>;

/// Outcome of a cascading tag delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDeletion {
    pub tag: Tag,
    /// Number of notes the tag id was removed from.
    pub untagged_notes: usize,
}

/// Note and tag stores sharing one backend.
#[derive(Debug)]
pub struct Notebook {
    notes: NoteRepository,
    tags: TagRegistry,
}

impl Notebook {
    /// Opens both stores under their default keys.
    pub fn open(backend: Rc<dyn KeyValueBackend>) -> NotebookResult<Self> {
        let notes = NoteRepository::open(backend.clone())?;
        let tags = TagRegistry::open(backend)?;
        let notebook = Self { notes, tags };
        for error in notebook.load_errors() {
            warn!(
                "event=notebook_open module=service status=recovered error_code=store_reset error={}",
                error
            );
        }
        info!(
            "event=notebook_open module=service status=ok notes={} tags={}",
            notebook.notes.len(),
            notebook.tags.tags().len()
        );
        Ok(notebook)
    }

    /// Opens a notebook persisted in a SQLite file.
    pub fn open_sqlite(path: impl AsRef<Path>) -> NotebookResult<Self> {
        let backend = SqliteBackend::open(path)?;
        Self::open(Rc::new(backend))
    }

    /// Opens an ephemeral notebook.
    pub fn in_memory() -> NotebookResult<Self> {
        Self::open(Rc::new(MemoryBackend::new()))
    }

    /// Creates and registers a tag with a generated id.
    pub fn create_tag(&mut self, label: &str) -> NotebookResult<Tag> {
        let tag = Tag::new(normalize_label(label)?);
        self.tags.add(tag.clone())?;
        Ok(tag)
    }

    /// Registers a tag with a caller-provided id.
    pub fn add_tag(&mut self, tag: Tag) -> NotebookResult<()> {
        let label = normalize_label(&tag.label)?;
        self.tags.add(Tag::with_id(tag.id, label))?;
        Ok(())
    }

    pub fn rename_tag(&mut self, id: &str, new_label: &str) -> NotebookResult<()> {
        let label = normalize_label(new_label)?;
        self.tags.rename(id, label)?;
        Ok(())
    }

    /// Deletes a tag and strips its id from every note.
    pub fn delete_tag(&mut self, id: &str) -> NotebookResult<TagDeletion> {
        // Fail before touching notes when the tag is unknown.
        self.tags.get(id)?;
        let untagged_notes = self.notes.remove_tag_references(id)?;
        let tag = self.tags.remove(id)?;
        Ok(TagDeletion {
            tag,
            untagged_notes,
        })
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.list()
    }

    pub fn tag(&self, id: &str) -> NotebookResult<Tag> {
        Ok(self.tags.get(id)?)
    }

    pub fn create_note(&mut self, data: NoteData) -> NotebookResult<Note> {
        self.validate_tags(&data, &[])?;
        Ok(self.notes.create(data)?)
    }

    pub fn update_note(&mut self, id: &str, data: NoteData) -> NotebookResult<()> {
        // Report a missing note before complaining about its payload.
        let existing = self.notes.get_by_id(id)?;
        self.validate_tags(&data, existing.tag_ids())?;
        self.notes.update(id, data)?;
        Ok(())
    }

    pub fn note(&self, id: &str) -> NotebookResult<Note> {
        Ok(self.notes.get_by_id(id)?)
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.all()
    }

    pub fn delete_note(&mut self, id: &str) -> NotebookResult<Note> {
        Ok(self.notes.delete(id)?)
    }

    /// Filters the current snapshots with `query`.
    pub fn list(&self, query: &NoteQuery) -> Vec<SimplifiedNote> {
        filter_notes(self.notes.notes(), self.tags.tags(), query)
    }

    /// Creates a memoized list view that tracks later writes.
    pub fn list_view(&mut self, query: NoteQuery) -> NoteListView {
        NoteListView::attach(&mut self.notes, &mut self.tags, query)
    }

    /// Detaches a view created by `list_view`.
    pub fn close_view(&mut self, view: NoteListView) {
        view.detach(&mut self.notes, &mut self.tags);
    }

    /// Decode errors both stores recovered from while opening.
    pub fn load_errors(&self) -> Vec<&StoreError> {
        self.notes
            .load_error()
            .into_iter()
            .chain(self.tags.load_error())
            .collect()
    }

    /// Rejects tag ids that are neither registered nor already on the note.
    fn validate_tags(&self, data: &NoteData, current: &[TagId]) -> NotebookResult<()> {
        let unknown = data
            .tag_ids
            .iter()
            .find(|id| !self.tags.contains(id) && !current.contains(*id));
        match unknown {
            Some(id) => Err(NotebookError::UnknownTag(id.clone())),
            None => Ok(()),
        }
    }
}

fn normalize_label(label: &str) -> NotebookResult<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(NotebookError::InvalidLabel(label.to_string()));
    }
    Ok(trimmed.to_string())
}
