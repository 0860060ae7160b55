//! Backing-store contract and in-memory implementation.

use crate::store::StoreResult;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Durable string key-value storage used by persisted cells.
///
/// Implementations are single-threaded and take `&self` so one backend can be
/// shared by several stores through `Rc`.
pub trait KeyValueBackend {
    /// Reads the raw serialized value for `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes the raw serialized value for `key`, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Process-local backend; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with raw entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueBackend, MemoryBackend};

    #[test]
    fn set_replaces_previous_value() {
        let backend = MemoryBackend::new();
        backend.set("NOTES", "[]").unwrap();
        backend.set("NOTES", "[1]").unwrap();
        assert_eq!(backend.get("NOTES").unwrap().as_deref(), Some("[1]"));
        assert_eq!(backend.get("TAGS").unwrap(), None);
    }
}
