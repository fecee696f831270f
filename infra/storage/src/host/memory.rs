use crate::error::StorageError;
use crate::host::HostStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An in-process host store.
///
/// Clones share the same map, so several [`NamespacedStore`](crate::NamespacedStore) instances
/// built from clones of one `MemoryStore` behave like callers sharing one `localStorage`.
///
/// ```rust
/// use mxp_storage::{HostStore, MemoryStore};
///
/// let host = MemoryStore::new();
/// let other = host.clone();
/// other.write("raw", "value").unwrap();
/// assert_eq!(host.read("raw").unwrap().as_deref(), Some("value"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw entries, across every namespace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { entries: Arc::new(RwLock::new(entries)) }
    }
}

impl HostStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.write().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let host = MemoryStore::new();
        let clone = host.clone();
        clone.write("a", "1").unwrap();
        assert_eq!(host.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn delete_missing_is_noop() {
        let host = MemoryStore::new();
        host.delete("nothing").unwrap();
        assert!(host.is_empty());
    }

    #[test]
    fn collects_from_pairs() {
        let host: MemoryStore = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(host.keys().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
        host.clear().unwrap();
        assert!(host.is_empty());
    }
}
