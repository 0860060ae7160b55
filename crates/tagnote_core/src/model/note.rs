//! Note domain model.
//!
//! # Responsibility
//! - Define the write shape (`NoteData`), the stored shape (`Note`) and the
//!   list projection (`SimplifiedNote`).
//!
//! # Invariants
//! - `Note::id` is generated once and preserved across edits.
//! - `tag_ids` order is kept as entered but carries no meaning for filtering.

use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = String;

/// Editable note content submitted by create/edit flows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub title: String,
    /// Markdown body.
    pub markdown: String,
    pub tag_ids: Vec<TagId>,
}

impl NoteData {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tag_ids: Vec::new(),
        }
    }

    /// Builder-style helper for attaching tag references.
    pub fn with_tags<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TagId>,
    {
        self.tag_ids = tag_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Stored note record.
///
/// Serialized flat (`id` next to the data fields) to match the persisted
/// payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(flatten)]
    pub data: NoteData,
}

impl Note {
    /// Creates a note with a generated UUID v4 id.
    pub fn new(data: NoteData) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), data)
    }

    pub fn with_id(id: impl Into<NoteId>, data: NoteData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    pub fn markdown(&self) -> &str {
        &self.data.markdown
    }

    pub fn tag_ids(&self) -> &[TagId] {
        &self.data.tag_ids
    }

    /// Resolves tag references against a registry snapshot.
    ///
    /// Keeps the note's relative order and skips ids with no registry entry.
    pub fn resolve_tags(&self, tags: &[Tag]) -> Vec<Tag> {
        self.data
            .tag_ids
            .iter()
            .filter_map(|tag_id| tags.iter().find(|tag| &tag.id == tag_id))
            .cloned()
            .collect()
    }
}

/// Read-time list projection of a note with resolved tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedNote {
    pub id: NoteId,
    pub title: String,
    pub tags: Vec<Tag>,
}

impl SimplifiedNote {
    pub fn from_note(note: &Note, tags: &[Tag]) -> Self {
        Self {
            id: note.id.clone(),
            title: note.data.title.clone(),
            tags: note.resolve_tags(tags),
        }
    }

    /// Returns whether a resolved tag with `tag_id` is attached.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteData, SimplifiedNote};
    use crate::model::tag::Tag;

    #[test]
    fn note_serializes_flat_with_camel_case_tag_ids() {
        let note = Note::with_id("n1", NoteData::new("T", "body").with_tags(["a"]));
        let value = serde_json::to_value(&note).expect("note should serialize");
        assert_eq!(value["id"], "n1");
        assert_eq!(value["title"], "T");
        assert_eq!(value["markdown"], "body");
        assert_eq!(value["tagIds"][0], "a");
    }

    #[test]
    fn resolve_tags_keeps_note_order_and_skips_unknown_ids() {
        let registry = vec![Tag::with_id("a", "A"), Tag::with_id("b", "B")];
        let note = Note::with_id("n1", NoteData::new("T", "").with_tags(["b", "ghost", "a"]));

        let simplified = SimplifiedNote::from_note(&note, &registry);
        let ids: Vec<&str> = simplified.tags.iter().map(|tag| tag.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
