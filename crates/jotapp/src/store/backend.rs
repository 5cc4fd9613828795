use crate::error::Result;
use std::rc::Rc;

/// Abstract interface for the raw string key-value store.
///
/// This trait handles the "how" of storage (directory of files vs memory), while
/// [`super::NoteStore`] handles the "what" (collection layout, ids, validation).
///
/// Backends offer no atomicity across calls and no compare-and-swap. All methods take
/// `&self`; implementations use interior mutability since jot is single-threaded.
pub trait KvBackend {
    /// Read the value under `key`. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    /// Must fail with `StorageQuota` rather than truncate when the value does not fit,
    /// and must leave the previous value intact on any failure.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<B: KvBackend + ?Sized> KvBackend for Rc<B> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Bytes an entry occupies against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
