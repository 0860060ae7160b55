//! Memoized note list kept current through store subscriptions.
//!
//! # Invariants
//! - Cached items are dropped whenever notes, tags or the query change.
//! - `items()` recomputes at most once per change.
//! - A dropped view unsubscribes itself on the next write to each store.

use crate::filter::note_filter::{filter_notes, NoteQuery};
use crate::model::note::{Note, SimplifiedNote};
use crate::model::tag::Tag;
use crate::repo::note_repo::NoteRepository;
use crate::repo::tag_repo::TagRegistry;
use crate::store::SubscriptionId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct ViewState {
    notes: Vec<Note>,
    tags: Vec<Tag>,
    query: NoteQuery,
    cached: Option<Vec<SimplifiedNote>>,
    recomputations: usize,
}

/// Reactive filtered note list.
///
/// Holds its own snapshots of notes and tags, refreshed by subscription
/// callbacks, so reads never need a borrow of the repositories.
#[derive(Debug)]
pub struct NoteListView {
    state: Rc<RefCell<ViewState>>,
    note_subscription: SubscriptionId,
    tag_subscription: SubscriptionId,
}

impl NoteListView {
    /// Subscribes a new view to both stores.
    pub fn attach(notes: &mut NoteRepository, tags: &mut TagRegistry, query: NoteQuery) -> Self {
        let state = Rc::new(RefCell::new(ViewState {
            notes: notes.all(),
            tags: tags.list(),
            query,
            cached: None,
            recomputations: 0,
        }));

        let weak: Weak<RefCell<ViewState>> = Rc::downgrade(&state);
        let note_subscription = notes.subscribe_while(move |next: &Vec<Note>| {
            let Some(state) = weak.upgrade() else {
                return false;
            };
            let mut state = state.borrow_mut();
            state.notes = next.clone();
            state.cached = None;
            true
        });

        let weak: Weak<RefCell<ViewState>> = Rc::downgrade(&state);
        let tag_subscription = tags.subscribe_while(move |next: &Vec<Tag>| {
            let Some(state) = weak.upgrade() else {
                return false;
            };
            let mut state = state.borrow_mut();
            state.tags = next.clone();
            state.cached = None;
            true
        });

        Self {
            state,
            note_subscription,
            tag_subscription,
        }
    }

    /// Removes this view's subscriptions from both stores.
    pub fn detach(self, notes: &mut NoteRepository, tags: &mut TagRegistry) {
        notes.unsubscribe(self.note_subscription);
        tags.unsubscribe(self.tag_subscription);
    }

    /// Replaces the query; the cache is kept when the query is unchanged.
    pub fn set_query(&self, query: NoteQuery) {
        let mut state = self.state.borrow_mut();
        if state.query != query {
            state.query = query;
            state.cached = None;
        }
    }

    /// Returns the filtered items, recomputing only when stale.
    pub fn items(&self) -> Vec<SimplifiedNote> {
        let mut state = self.state.borrow_mut();
        if let Some(cached) = state.cached.as_ref() {
            return cached.clone();
        }
        let items = filter_notes(&state.notes, &state.tags, &state.query);
        state.recomputations += 1;
        state.cached = Some(items.clone());
        items
    }

    /// Number of times the filter actually ran.
    pub fn recomputations(&self) -> usize {
        self.state.borrow().recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::NoteListView;
    use crate::filter::note_filter::NoteQuery;
    use crate::model::note::NoteData;
    use crate::model::tag::Tag;
    use crate::repo::note_repo::NoteRepository;
    use crate::repo::tag_repo::TagRegistry;
    use crate::store::{KeyValueBackend, MemoryBackend};
    use std::rc::Rc;

    fn stores() -> (NoteRepository, TagRegistry) {
        let backend: Rc<dyn KeyValueBackend> = Rc::new(MemoryBackend::new());
        (
            NoteRepository::open(backend.clone()).unwrap(),
            TagRegistry::open(backend).unwrap(),
        )
    }

    #[test]
    fn reads_are_memoized_until_an_input_changes() {
        let (mut notes, mut tags) = stores();
        notes.create(NoteData::new("one", "")).unwrap();
        let view = NoteListView::attach(&mut notes, &mut tags, NoteQuery::new());

        assert_eq!(view.items().len(), 1);
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.recomputations(), 1);

        view.set_query(NoteQuery::new());
        view.items();
        assert_eq!(view.recomputations(), 1);

        notes.create(NoteData::new("two", "")).unwrap();
        assert_eq!(view.items().len(), 2);
        assert_eq!(view.recomputations(), 2);
    }

    #[test]
    fn tag_changes_refresh_resolved_labels() {
        let (mut notes, mut tags) = stores();
        tags.add(Tag::with_id("a", "Work")).unwrap();
        notes
            .create(NoteData::new("one", "").with_tags(["a"]))
            .unwrap();
        let view = NoteListView::attach(&mut notes, &mut tags, NoteQuery::new().with_tags(["a"]));
        assert_eq!(view.items()[0].tags[0].label, "Work");

        tags.rename("a", "Job").unwrap();
        assert_eq!(view.items()[0].tags[0].label, "Job");
    }

    #[test]
    fn detached_view_no_longer_subscribes() {
        let (mut notes, mut tags) = stores();
        let view = NoteListView::attach(&mut notes, &mut tags, NoteQuery::new());
        view.detach(&mut notes, &mut tags);
        // Writes after detach must not panic or leak callbacks.
        notes.create(NoteData::new("one", "")).unwrap();
        tags.add(Tag::with_id("a", "A")).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.subscriber_count(), 0);
        assert_eq!(tags.subscriber_count(), 0);
    }

    #[test]
    fn dropped_views_are_unsubscribed_on_next_write() {
        let (mut notes, mut tags) = stores();
        let kept = NoteListView::attach(&mut notes, &mut tags, NoteQuery::new());
        for _ in 0..1000 {
            let view = NoteListView::attach(&mut notes, &mut tags, NoteQuery::new());
            drop(view);
        }
        assert_eq!(notes.subscriber_count(), 1001);

        notes.create(NoteData::new("one", "")).unwrap();
        assert_eq!(notes.subscriber_count(), 1);
        assert_eq!(tags.subscriber_count(), 1001);

        tags.add(Tag::with_id("a", "A")).unwrap();
        assert_eq!(tags.subscriber_count(), 1);
        assert_eq!(kept.items().len(), 1);
    }
}
