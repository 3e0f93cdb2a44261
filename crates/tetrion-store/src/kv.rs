use std::{cell::RefCell, rc::Rc};

use crate::StoreError;

/// String-keyed storage of string values.
///
/// Reads never fail: a value that cannot be read is reported as absent.
/// Writes may fail, and callers decide how to surface the failure.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S> KeyValueStore for &mut S
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S> KeyValueStore for Box<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Cloneable handle to a store shared by several owners on one thread.
///
/// ```
/// use tetrion_store::{KeyValueStore as _, MemoryStore, SharedStore};
///
/// let store = SharedStore::new(MemoryStore::new());
/// let mut writer = store.clone();
/// writer.set("key", "value").unwrap();
/// assert_eq!(store.get("key").as_deref(), Some("value"));
/// ```
#[derive(Debug, Default)]
pub struct SharedStore<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> SharedStore<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the underlying store.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl<S> KeyValueStore for SharedStore<S>
where
    S: KeyValueStore,
{
    fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().remove(key)
    }
}
