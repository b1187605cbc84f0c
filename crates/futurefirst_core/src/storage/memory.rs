//! In-process key-value backend with an optional byte quota.

use super::{KeyValueStore, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Map-backed store. Quota counts key plus value bytes across all entries.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once total usage would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.items
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let replaced = self
                .items
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let required_bytes = self.used_bytes() - replaced + key.len() + value.len();
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

/// Memory backend with switchable failures for exercising error paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FaultyKeyValueStore {
    pub(crate) inner: MemoryKeyValueStore,
    pub(crate) fail_reads: std::cell::Cell<bool>,
    pub(crate) fail_scan: std::cell::Cell<bool>,
    pub(crate) fail_removes: RefCell<std::collections::BTreeSet<String>>,
}

#[cfg(test)]
impl FaultyKeyValueStore {
    pub(crate) fn seeded(keys: &[&str]) -> Self {
        let store = Self::default();
        for key in keys {
            store
                .inner
                .set_item(key, "{}")
                .expect("memory write without quota");
        }
        store
    }

    pub(crate) fn fail_remove_of(&self, key: &str) {
        self.fail_removes.borrow_mut().insert(key.to_string());
    }

    fn fault(op: &str) -> StorageError {
        StorageError::Db(crate::db::DbError::Io(std::io::Error::other(format!(
            "injected {op} fault"
        ))))
    }
}

#[cfg(test)]
impl KeyValueStore for FaultyKeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(Self::fault("read"));
        }
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        if self.fail_removes.borrow().contains(key) {
            return Err(Self::fault("remove"));
        }
        self.inner.remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        if self.fail_scan.get() {
            return Err(Self::fault("scan"));
        }
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn set_get_remove() {
        let store = MemoryKeyValueStore::new();
        store.set_item("b", "2").unwrap();
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a").unwrap(), None);
    }

    #[test]
    fn quota_rejects_growth_but_allows_shrinking_overwrite() {
        let store = MemoryKeyValueStore::with_quota(10);
        store.set_item("k", "123456789").unwrap();
        let err = store.set_item("x", "1").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota_bytes: 10, .. }));
        store.set_item("k", "1").unwrap();
        assert_eq!(store.used_bytes(), 2);
        assert_eq!(store.get_item("x").unwrap(), None);
    }
}
