//! Title + tag filtering for note lists.

use crate::model::note::{Note, SimplifiedNote};
use crate::model::tag::{Tag, TagId};
use std::collections::BTreeSet;

/// Filter inputs supplied by list views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    /// Case-insensitive title substring; empty matches every note.
    pub title_query: String,
    /// Every id must be attached to a note for it to match.
    pub tag_filter: BTreeSet<TagId>,
}

impl NoteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title_query: impl Into<String>) -> Self {
        self.title_query = title_query.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TagId>,
    {
        self.tag_filter = tag_ids.into_iter().map(Into::into).collect();
        self
    }

    fn matches(&self, title_needle: &str, note: &SimplifiedNote) -> bool {
        let title_ok = title_needle.is_empty() || note.title.to_lowercase().contains(title_needle);
        let tags_ok = self
            .tag_filter
            .iter()
            .all(|tag_id| note.has_tag(tag_id.as_str()));
        title_ok && tags_ok
    }
}

/// Resolves and filters notes for display.
///
/// Notes are first projected to `SimplifiedNote` (unknown tag ids dropped),
/// then kept when both the title and the tag predicate hold.
pub fn filter_notes(notes: &[Note], tags: &[Tag], query: &NoteQuery) -> Vec<SimplifiedNote> {
    let title_needle = query.title_query.to_lowercase();
    notes
        .iter()
        .map(|note| SimplifiedNote::from_note(note, tags))
        .filter(|note| query.matches(&title_needle, note))
        .collect()
}
