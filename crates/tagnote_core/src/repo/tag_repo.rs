//! Tag registry backed by one persisted collection.
//!
//! # Invariants
//! - Tag ids are unique within the registry.
//! - Insertion order is preserved; renames never move a tag.

use crate::model::tag::{Tag, TagId};
use crate::repo::{RepoError, RepoResult};
use crate::store::{InitialValue, KeyValueBackend, PersistedStore, StoreError, SubscriptionId};
use log::info;
use std::rc::Rc;

/// Backend key used for the tag collection.
pub const TAGS_KEY: &str = "TAGS";

/// Canonical list of tags referenced by notes.
#[derive(Debug)]
pub struct TagRegistry {
    store: PersistedStore<Vec<Tag>>,
}

impl TagRegistry {
    /// Opens the registry under `TAGS_KEY`, starting empty when nothing is stored.
    pub fn open(backend: Rc<dyn KeyValueBackend>) -> RepoResult<Self> {
        let store = PersistedStore::open(backend, TAGS_KEY, InitialValue::producer(Vec::new))?;
        Ok(Self { store })
    }

    /// Appends a tag.
    ///
    /// # Errors
    /// - `DuplicateId` when a tag with the same id exists.
    pub fn add(&mut self, tag: Tag) -> RepoResult<()> {
        if self.contains(&tag.id) {
            return Err(RepoError::DuplicateId(tag.id));
        }
        let tag_id = tag.id.clone();
        self.store.update(|tags| tags.push(tag))?;
        info!("event=tag_add module=repo status=ok tag_id={tag_id}");
        Ok(())
    }

    /// Returns all tags in insertion order.
    pub fn list(&self) -> Vec<Tag> {
        self.store.snapshot()
    }

    /// Borrows the current tag snapshot.
    pub fn tags(&self) -> &[Tag] {
        self.store.get()
    }

    pub fn get(&self, id: &str) -> RepoResult<Tag> {
        self.tags()
            .iter()
            .find(|tag| tag.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags().iter().any(|tag| tag.id == id)
    }

    /// Updates the label of one tag in place.
    pub fn rename(&mut self, id: &str, new_label: impl Into<String>) -> RepoResult<()> {
        let new_label = new_label.into();
        self.store.try_update(|tags| {
            let tag = tags
                .iter_mut()
                .find(|tag| tag.id == id)
                .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
            tag.label = new_label;
            Ok::<_, RepoError>(())
        })?;
        info!("event=tag_rename module=repo status=ok tag_id={id}");
        Ok(())
    }

    /// Removes one tag from the registry and returns it.
    ///
    /// Notes referencing the tag are not touched here; callers that delete
    /// tags must also strip the id from notes (see `Notebook::delete_tag`).
    pub fn remove(&mut self, id: &str) -> RepoResult<Tag> {
        let removed = self.store.try_update(|tags| {
            let position = tags
                .iter()
                .position(|tag| tag.id == id)
                .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
            Ok::<_, RepoError>(tags.remove(position))
        })?;
        info!("event=tag_remove module=repo status=ok tag_id={id}");
        Ok(removed)
    }

    /// Ids of all registered tags, in insertion order.
    pub fn ids(&self) -> Vec<TagId> {
        self.tags().iter().map(|tag| tag.id.clone()).collect()
    }

    pub fn load_error(&self) -> Option<&StoreError> {
        self.store.load_error()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Vec<Tag>) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn subscribe_while(
        &mut self,
        subscriber: impl Fn(&Vec<Tag>) -> bool + 'static,
    ) -> SubscriptionId {
        self.store.subscribe_while(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.store.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::TagRegistry;
    use crate::model::tag::Tag;
    use crate::repo::RepoError;
    use crate::store::MemoryBackend;
    use std::rc::Rc;

    fn registry() -> TagRegistry {
        TagRegistry::open(Rc::new(MemoryBackend::new())).unwrap()
    }

    #[test]
    fn add_rejects_duplicate_ids_but_allows_duplicate_labels() {
        let mut tags = registry();
        tags.add(Tag::with_id("a", "Work")).unwrap();
        tags.add(Tag::with_id("b", "Work")).unwrap();

        let err = tags.add(Tag::with_id("a", "Other")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateId(id) if id == "a"));
        assert_eq!(tags.list().len(), 2);
    }

    #[test]
    fn rename_updates_label_in_place() {
        let mut tags = registry();
        tags.add(Tag::with_id("a", "Work")).unwrap();
        tags.add(Tag::with_id("b", "Home")).unwrap();

        tags.rename("a", "Job").unwrap();
        assert_eq!(
            tags.list(),
            vec![Tag::with_id("a", "Job"), Tag::with_id("b", "Home")]
        );
    }

    #[test]
    fn rename_and_remove_report_missing_ids() {
        let mut tags = registry();
        assert!(matches!(
            tags.rename("nope", "x").unwrap_err(),
            RepoError::NotFound(_)
        ));
        assert!(matches!(tags.remove("nope").unwrap_err(), RepoError::NotFound(_)));
    }

    #[test]
    fn remove_returns_tag_and_keeps_remaining_order() {
        let mut tags = registry();
        for (id, label) in [("a", "A"), ("b", "B"), ("c", "C")] {
            tags.add(Tag::with_id(id, label)).unwrap();
        }
        let removed = tags.remove("b").unwrap();
        assert_eq!(removed.label, "B");
        assert_eq!(tags.ids(), vec!["a".to_string(), "c".to_string()]);
    }
}
