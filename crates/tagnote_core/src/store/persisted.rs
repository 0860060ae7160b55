//! Generic persisted state cell.
//!
//! # Responsibility
//! - Load the initial value for one key, falling back to a (lazy) default.
//! - Serialize every mutation to the backing store.
//! - Notify subscribers after each successful write, dropping the ones that
//!   report they are no longer interested.
//!
//! # Invariants
//! - A `Producer` default runs at most once, and never when a decodable
//!   stored value exists.
//! - A failed write leaves the in-memory value untouched.

use crate::store::{KeyValueBackend, StoreError, StoreResult};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Default used when no (valid) stored value exists.
pub enum InitialValue<T> {
    /// Literal default, used as-is.
    Value(T),
    /// Lazily invoked default producer.
    Producer(Box<dyn FnOnce() -> T>),
}

impl<T> InitialValue<T> {
    pub fn producer(produce: impl FnOnce() -> T + 'static) -> Self {
        Self::Producer(Box::new(produce))
    }

    fn resolve(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Producer(produce) => produce(),
        }
    }
}

impl<T> From<T> for InitialValue<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Debug> Debug for InitialValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Handle returned by `PersistedStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Returns `false` once the subscriber should be dropped.
type Subscriber<T> = Box<dyn Fn(&T) -> bool>;

/// Durable in-memory cell for one backend key.
pub struct PersistedStore<T> {
    backend: Rc<dyn KeyValueBackend>,
    key: String,
    value: T,
    load_error: Option<StoreError>,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_subscription: u64,
}

impl<T> PersistedStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the cell for `key`, reading any previously stored value.
    ///
    /// A stored payload that cannot be decoded is not fatal: the default is
    /// used and the decode error stays available through `load_error()`.
    ///
    /// # Errors
    /// - Returns an error only when the backend read itself fails.
    pub fn open(
        backend: Rc<dyn KeyValueBackend>,
        key: impl Into<String>,
        default: impl Into<InitialValue<T>>,
    ) -> StoreResult<Self> {
        let key = key.into();
        let default = default.into();
        let raw = backend.get(&key)?;

        let (value, load_error) = match raw {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    info!(
                        "event=store_load module=store status=ok key={} source=stored bytes={}",
                        key,
                        raw.len()
                    );
                    (value, None)
                }
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=fallback key={} source=default error_code=deserialization_failed error={}",
                        key, err
                    );
                    let error = StoreError::Deserialization {
                        key: key.clone(),
                        message: err.to_string(),
                    };
                    (default.resolve(), Some(error))
                }
            },
            None => {
                info!(
                    "event=store_load module=store status=ok key={} source=default",
                    key
                );
                (default.resolve(), None)
            }
        };

        Ok(Self {
            backend,
            key,
            value,
            load_error,
            subscribers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Replaces the value, writing it to the backend first.
    pub fn set(&mut self, value: T) -> StoreResult<()> {
        let encoded = serde_json::to_string(&value).map_err(|err| StoreError::Serialization {
            key: self.key.clone(),
            message: err.to_string(),
        })?;
        self.backend.set(&self.key, &encoded)?;
        debug!(
            "event=store_write module=store status=ok key={} bytes={}",
            self.key,
            encoded.len()
        );

        self.value = value;
        let current = &self.value;
        let before = self.subscribers.len();
        self.subscribers.retain(|(_, subscriber)| subscriber(current));
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            debug!(
                "event=store_unsubscribe module=store status=ok key={} dropped={}",
                self.key, dropped
            );
        }
        Ok(())
    }

    /// Applies `mutate` to a copy of the current value and persists it.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> StoreResult<R>
    where
        T: Clone,
    {
        let mut next = self.value.clone();
        let output = mutate(&mut next);
        self.set(next)?;
        Ok(output)
    }

    /// Like `update`, but nothing is written when `mutate` fails.
    pub fn try_update<R, E>(&mut self, mutate: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        T: Clone,
        E: From<StoreError>,
    {
        let mut next = self.value.clone();
        let output = mutate(&mut next)?;
        self.set(next)?;
        Ok(output)
    }
}

impl<T> PersistedStore<T> {
    /// Borrows the current in-memory value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Returns an owned copy of the current value.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.value.clone()
    }

    /// Decode error recovered from while opening, if any.
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// Registers a callback invoked with the new value after every write.
    pub fn subscribe(&mut self, subscriber: impl Fn(&T) + 'static) -> SubscriptionId {
        self.subscribe_while(move |value| {
            subscriber(value);
            true
        })
    }

    /// Registers a callback that stays subscribed while it returns `true`.
    ///
    /// The first `false` drops it without an explicit `unsubscribe`.
    pub fn subscribe_while(
        &mut self,
        subscriber: impl Fn(&T) -> bool + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscription. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(current, _)| *current != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Debug> Debug for PersistedStore<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedStore")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("load_error", &self.load_error)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
