use std::cell::Cell;
use std::rc::Rc;
use tagnote_core::{
    InitialValue, KeyValueBackend, Note, NoteData, PersistedStore, SqliteBackend, Tag, NOTES_KEY,
};

fn sample_notes() -> Vec<Note> {
    vec![
        Note::with_id(
            "n1",
            NoteData::new("Grocery List", "- milk\n- eggs").with_tags(["a", "b"]),
        ),
        Note::with_id("n2", NoteData::new("Empty", "")),
        Note::with_id("n3", NoteData::new("Ünïcode \"quotes\"", "`code`\n\n# h1")),
    ]
}

#[test]
fn note_collection_survives_serialize_deserialize() {
    let notes = sample_notes();
    let encoded = serde_json::to_string(&notes).unwrap();
    let decoded: Vec<Note> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, notes);
}

#[test]
fn reads_browser_shaped_payloads() {
    let raw = r#"[{"id":"n1","title":"T","markdown":"m","tagIds":["x"]}]"#;
    let notes: Vec<Note> = serde_json::from_str(raw).unwrap();
    assert_eq!(notes[0].tag_ids(), ["x".to_string()]);

    let tags: Vec<Tag> = serde_json::from_str(r#"[{"id":"x","label":"Work"}]"#).unwrap();
    assert_eq!(tags, vec![Tag::with_id("x", "Work")]);
}

#[test]
fn sqlite_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite3");

    {
        let backend: Rc<dyn KeyValueBackend> = Rc::new(SqliteBackend::open(&path).unwrap());
        let mut store: PersistedStore<Vec<Note>> =
            PersistedStore::open(backend, NOTES_KEY, Vec::new()).unwrap();
        store.set(sample_notes()).unwrap();
    }

    let backend: Rc<dyn KeyValueBackend> = Rc::new(SqliteBackend::open(&path).unwrap());
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let store: PersistedStore<Vec<Note>> = PersistedStore::open(
        backend,
        NOTES_KEY,
        InitialValue::producer(move || {
            counter.set(counter.get() + 1);
            Vec::new()
        }),
    )
    .unwrap();

    assert_eq!(store.get(), &sample_notes());
    assert_eq!(calls.get(), 0, "producer must not run when a value is stored");
}

#[test]
fn corrupt_sqlite_payload_falls_back_to_default() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend.set(NOTES_KEY, "{not json").unwrap();
    let backend: Rc<dyn KeyValueBackend> = Rc::new(backend);

    let mut store: PersistedStore<Vec<Note>> =
        PersistedStore::open(backend.clone(), NOTES_KEY, Vec::new()).unwrap();
    assert!(store.get().is_empty());
    assert!(store.load_error().unwrap().is_deserialization());

    // The next write replaces the corrupt payload.
    store.set(sample_notes()).unwrap();
    let reopened: PersistedStore<Vec<Note>> =
        PersistedStore::open(backend, NOTES_KEY, Vec::new()).unwrap();
    assert!(reopened.load_error().is_none());
    assert_eq!(reopened.get().len(), 3);
}
