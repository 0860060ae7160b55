//! Tag domain model.
//!
//! # Invariants
//! - `id` is stable and never reassigned to another tag.
//! - Two tags with the same `label` but different ids are distinct.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a tag.
pub type TagId = String;

/// Canonical labeled category referenced by notes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// User-facing label, mutable through the registry.
    pub label: String,
}

impl Tag {
    /// Creates a tag with a freshly generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label)
    }

    /// Creates a tag with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: impl Into<TagId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tag;

    #[test]
    fn generated_ids_are_distinct_for_equal_labels() {
        let first = Tag::new("work");
        let second = Tag::new("work");
        assert_ne!(first.id, second.id);
        assert_ne!(first, second);
    }

    #[test]
    fn serializes_with_browser_field_names() {
        let tag = Tag::with_id("t1", "Work");
        let json = serde_json::to_string(&tag).expect("tag should serialize");
        assert_eq!(json, r#"{"id":"t1","label":"Work"}"#);
    }
}
