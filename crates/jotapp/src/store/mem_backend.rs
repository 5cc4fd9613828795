use super::backend::{entry_size, KvBackend};
use crate::error::{JotError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory key-value backend.
///
/// Uses `RefCell` for interior mutability since jot is single-threaded. Share one
/// instance between several stores through `Rc<MemBackend>` or `&MemBackend` to model
/// independent contexts writing the same storage.
#[derive(Default)]
pub struct MemBackend {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| entry_size(k, v))
            .sum()
    }
}

impl KvBackend for MemBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(JotError::Io(std::io::Error::other("Simulated write error")));
        }

        let mut entries = self.entries.borrow_mut();
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = entry_size(key, value);
            if others + needed > quota {
                return Err(JotError::StorageQuota {
                    key: key.to_string(),
                    needed,
                    available: quota.saturating_sub(others),
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let backend = MemBackend::new();
        assert_eq!(backend.get("notes").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let backend = MemBackend::new();
        backend.set("notes", "[]").unwrap();
        assert_eq!(backend.get("notes").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_value() {
        let backend = MemBackend::with_quota(20);
        backend.set("k", "small").unwrap();

        let err = backend.set("k", "this value is far too long").unwrap_err();
        match err {
            JotError::StorageQuota {
                needed, available, ..
            } => {
                assert_eq!(needed, 27);
                assert_eq!(available, 20);
            }
            other => panic!("expected quota error, got {other:?}"),
        }
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_quota_counts_other_keys() {
        let backend = MemBackend::with_quota(16);
        backend.set("appSettings", "{}").unwrap(); // 13 bytes
        assert!(backend.set("notes", "[]").is_err()); // 7 more
        assert!(backend.set("n", "[]").is_ok()); // 3 more
    }

    #[test]
    fn test_simulated_write_error() {
        let backend = MemBackend::new();
        backend.set_simulate_write_error(true);
        assert!(backend.set("k", "v").is_err());
        assert_eq!(backend.get("k").unwrap(), None);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_remove_absent_key_is_ok() {
        let backend = MemBackend::new();
        backend.remove("nothing").unwrap();
        backend.set("k", "v").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }
}
