//! Note repository backed by one persisted collection.
//!
//! # Responsibility
//! - Create notes with generated ids and replace their content by id.
//! - Serve synchronous lookups from the in-memory snapshot.
//!
//! # Invariants
//! - Note ids are UUID v4 strings and never change after creation.
//! - `update` keeps the note at its current position.
//! - Tag references are stored as given; existence checks belong to
//!   `Notebook`.

use crate::model::note::{Note, NoteData, NoteId};
use crate::repo::{RepoError, RepoResult};
use crate::store::{InitialValue, KeyValueBackend, PersistedStore, StoreError, SubscriptionId};
use log::info;
use std::rc::Rc;

/// Backend key used for the note collection.
pub const NOTES_KEY: &str = "NOTES";

/// Owner of the canonical note collection.
#[derive(Debug)]
pub struct NoteRepository {
    store: PersistedStore<Vec<Note>>,
}

impl NoteRepository {
    /// Opens the repository under `NOTES_KEY`, starting empty when nothing is stored.
    pub fn open(backend: Rc<dyn KeyValueBackend>) -> RepoResult<Self> {
        let store = PersistedStore::open(backend, NOTES_KEY, InitialValue::producer(Vec::new))?;
        Ok(Self { store })
    }

    /// Appends a new note with a freshly generated id and returns it.
    pub fn create(&mut self, data: NoteData) -> RepoResult<Note> {
        let note = Note::new(data);
        let created = note.clone();
        self.store.update(|notes| notes.push(note))?;
        info!(
            "event=note_create module=repo status=ok note_id={} tag_count={}",
            created.id,
            created.tag_ids().len()
        );
        Ok(created)
    }

    /// Replaces title, markdown and tag ids of one note.
    ///
    /// # Errors
    /// - `NotFound` when no note has `id`; nothing is written in that case.
    pub fn update(&mut self, id: &str, data: NoteData) -> RepoResult<()> {
        self.store.try_update(|notes| {
            let note = notes
                .iter_mut()
                .find(|note| note.id == id)
                .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
            note.data = data;
            Ok::<_, RepoError>(())
        })?;
        info!("event=note_update module=repo status=ok note_id={id}");
        Ok(())
    }

    /// Looks one note up in the in-memory snapshot.
    pub fn get_by_id(&self, id: &str) -> RepoResult<Note> {
        self.notes()
            .iter()
            .find(|note| note.id == id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    /// Returns all notes in collection order.
    pub fn all(&self) -> Vec<Note> {
        self.store.snapshot()
    }

    /// Borrows the current note snapshot.
    pub fn notes(&self) -> &[Note] {
        self.store.get()
    }

    pub fn len(&self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes().is_empty()
    }

    /// Removes one note and returns it; remaining notes keep their order.
    pub fn delete(&mut self, id: &str) -> RepoResult<Note> {
        let removed = self.store.try_update(|notes| {
            let position = notes
                .iter()
                .position(|note| note.id == id)
                .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
            Ok::<_, RepoError>(notes.remove(position))
        })?;
        info!("event=note_delete module=repo status=ok note_id={id}");
        Ok(removed)
    }

    /// Strips `tag_id` from every note and returns how many notes changed.
    ///
    /// Nothing is written when no note references the tag.
    pub fn remove_tag_references(&mut self, tag_id: &str) -> RepoResult<usize> {
        let affected = self
            .notes()
            .iter()
            .filter(|note| note.tag_ids().iter().any(|id| id == tag_id))
            .count();
        if affected == 0 {
            return Ok(0);
        }

        self.store.update(|notes| {
            for note in notes.iter_mut() {
                note.data.tag_ids.retain(|id| id != tag_id);
            }
        })?;
        info!(
            "event=note_untag module=repo status=ok tag_id={} affected={}",
            tag_id, affected
        );
        Ok(affected)
    }

    /// Ids of notes in collection order.
    pub fn ids(&self) -> Vec<NoteId> {
        self.notes().iter().map(|note| note.id.clone()).collect()
    }

    pub fn load_error(&self) -> Option<&StoreError> {
        self.store.load_error()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Vec<Note>) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn subscribe_while(
        &mut self,
        subscriber: impl Fn(&Vec<Note>) -> bool + 'static,
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
    use super::{NoteRepository, NOTES_KEY};
    use crate::model::note::NoteData;
    use crate::repo::RepoError;
    use crate::store::MemoryBackend;
    use std::rc::Rc;

    #[test]
    fn create_generates_distinct_uuid_ids() {
        let mut repo = NoteRepository::open(Rc::new(MemoryBackend::new())).unwrap();
        let first = repo.create(NoteData::new("one", "")).unwrap();
        let second = repo.create(NoteData::new("two", "")).unwrap();

        assert_ne!(first.id, second.id);
        assert!(uuid::Uuid::parse_str(&first.id).is_ok());
        assert_eq!(repo.ids(), vec![first.id, second.id]);
    }

    #[test]
    fn update_keeps_position_and_other_notes() {
        let mut repo = NoteRepository::open(Rc::new(MemoryBackend::new())).unwrap();
        let a = repo.create(NoteData::new("a", "")).unwrap();
        let b = repo.create(NoteData::new("b", "")).unwrap();
        let c = repo.create(NoteData::new("c", "")).unwrap();

        repo.update(&b.id, NoteData::new("b2", "body").with_tags(["t"]))
            .unwrap();

        let all = repo.all();
        assert_eq!(all[0], a);
        assert_eq!(all[1].id, b.id);
        assert_eq!(all[1].title(), "b2");
        assert_eq!(all[1].tag_ids(), ["t".to_string()]);
        assert_eq!(all[2], c);
    }

    #[test]
    fn update_missing_note_writes_nothing() {
        let backend = Rc::new(MemoryBackend::new());
        let mut repo = NoteRepository::open(backend.clone()).unwrap();

        let err = repo.update("missing", NoteData::default()).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == "missing"));
        assert_eq!(backend.raw(NOTES_KEY), None);
    }

    #[test]
    fn remove_tag_references_touches_only_referencing_notes() {
        let mut repo = NoteRepository::open(Rc::new(MemoryBackend::new())).unwrap();
        let tagged = repo
            .create(NoteData::new("x", "").with_tags(["a", "b"]))
            .unwrap();
        repo.create(NoteData::new("y", "").with_tags(["b"])).unwrap();

        assert_eq!(repo.remove_tag_references("a").unwrap(), 1);
        assert_eq!(repo.remove_tag_references("zzz").unwrap(), 0);
        assert_eq!(
            repo.get_by_id(&tagged.id).unwrap().tag_ids(),
            ["b".to_string()]
        );
    }

    #[test]
    fn delete_removes_note() {
        let mut repo = NoteRepository::open(Rc::new(MemoryBackend::new())).unwrap();
        let note = repo.create(NoteData::new("x", "")).unwrap();
        assert_eq!(repo.delete(&note.id).unwrap(), note);
        assert!(repo.is_empty());
        assert!(matches!(
            repo.get_by_id(&note.id).unwrap_err(),
            RepoError::NotFound(_)
        ));
    }
}
