//! Host key-value stores.
//!
//! A host store is a flat, string-to-string map shared by everyone in the process, in the shape
//! of a browser's `localStorage`. The [`NamespacedStore`](crate::NamespacedStore) never assumes
//! it is the only writer.

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
mod browser;
mod file;
mod memory;

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub use browser::BrowserStore;
pub use file::{FileStore, FileStoreBuilder};
pub use memory::MemoryStore;

use crate::error::StorageError;
use std::sync::Arc;

/// The minimal contract of a host key-value store.
///
/// Implementations take `&self`: a handle is shared between every [`NamespacedStore`] that
/// points at the same underlying map, so mutation goes through interior locking (or through the
/// host runtime itself).
///
/// [`NamespacedStore`]: crate::NamespacedStore
pub trait HostStore {
    /// Returns the raw value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error only when the host itself fails.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the host rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the host rejects the removal.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key, including keys written by unrelated code.
    ///
    /// # Errors
    /// Returns an error if the host rejects the operation.
    fn clear(&self) -> Result<(), StorageError>;

    /// A snapshot of every key currently stored, in no particular order.
    ///
    /// # Errors
    /// Returns an error if the host cannot enumerate its keys.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<T: HostStore + ?Sized> HostStore for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

impl<T: HostStore + ?Sized> HostStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}
