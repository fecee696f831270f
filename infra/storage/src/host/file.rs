//! A host store persisted as a single JSON document on disk.

use crate::error::{StorageError, StorageErrorExt};
use crate::host::HostStore;
use crate::maintenance::{self, TMP_MARKER};
use parking_lot::Mutex;
use private::Sealed;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

type Entries = BTreeMap<String, String>;

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

/// Type-safe builder for [`FileStore`]; a path must be supplied before [`open`](Self::open).
#[allow(private_bounds)]
#[derive(Debug)]
pub struct FileStoreBuilder<S: Sealed = NoPath> {
    state: S,
    create: bool,
}

impl Default for FileStoreBuilder<NoPath> {
    fn default() -> Self {
        Self { state: NoPath, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> FileStoreBuilder<S> {
    #[must_use = "Sets whether a missing store file should be created"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl FileStoreBuilder<NoPath> {
    #[must_use = "Sets the path of the JSON document backing the store"]
    pub fn path(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithPath> {
        FileStoreBuilder { state: WithPath(path.into()), create: self.create }
    }
}

impl FileStoreBuilder<WithPath> {
    /// Opens (or bootstraps) the store file and loads its entries.
    ///
    /// Boot sequence:
    /// 1. **Bootstrapping**: with `create(true)`, missing parent directories and an empty document
    ///    are written.
    /// 2. **Loading**: the document is parsed into memory; all reads are served from memory.
    /// 3. **Self-Healing**: stale temp files left next to the document by interrupted writes are
    ///    removed. Failures there are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreUnavailable`] if the file is missing and `create` is false.
    /// Returns [`StorageError::Io`] if the file cannot be read or created.
    /// Returns [`StorageError::Serialization`] if the file is not a JSON object of strings.
    pub fn open(self) -> Result<FileStore, StorageError> {
        let path = self.state.0;

        let entries = if path.exists() {
            let raw = fs::read(&path).context(format!("Failed to read store: {}", path.display()))?;
            serde_json::from_slice::<Entries>(&raw)
                .context(format!("Store is not a JSON object of strings: {}", path.display()))?
        } else if self.create {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context(format!(
                    "Failed to bootstrap store directory: {}",
                    parent.display()
                ))?;
            }
            info!(path = %path.display(), "Bootstrapped store file");
            Entries::new()
        } else {
            return Err(StorageError::StoreUnavailable {
                message: path.display().to_string().into(),
                context: Some("Store file does not exist and creation is disabled".into()),
            });
        };

        let store = FileStore {
            inner: Arc::new(FileStoreInner {
                path,
                entries: Mutex::new(entries),
                tmp_counter: AtomicU64::new(1),
            }),
        };

        {
            let entries = store.entries.lock();
            if !store.path.exists() {
                store.persist(&entries)?;
            }
        }

        maintenance::purge_tmp(&store.path);

        Ok(store)
    }
}

/// The internal shared state of a [`FileStore`].
#[derive(Debug)]
pub struct FileStoreInner {
    /// The JSON document holding every entry.
    pub(crate) path: PathBuf,
    /// In-memory copy of the document; the lock also serializes writers.
    entries: Mutex<Entries>,
    /// A unique counter used to generate temporary file names.
    tmp_counter: AtomicU64,
}

/// A durable host store backed by one JSON document.
///
/// Every mutation rewrites the document with an atomic swap (unique temp file, `fsync`,
/// rename), so the file on disk is always either the previous or the next state. The handle is
/// reference-counted and clones share the same in-memory map.
///
/// ```rust
/// use mxp_storage::{FileStore, HostStore, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let host = FileStore::builder().path(tmp.path().join("local.json")).open()?;
/// host.write("theme", "dark")?;
///
/// let reopened = FileStore::builder().path(tmp.path().join("local.json")).create(false).open()?;
/// assert_eq!(reopened.read("theme")?.as_deref(), Some("dark"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

impl Deref for FileStore {
    type Target = FileStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FileStore {
    #[must_use = "The store is not opened until you call .open()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::default()
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the entries, persists it, then publishes it.
    fn mutate(&self, change: impl FnOnce(&mut Entries) -> bool) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(entries).context("Encoding store document")?;
        let temp = unique_tmp_path(&self.path, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&data).context("Write failed")?;
            file.sync_all().context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &self.path) {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(&self.path).context(format!(
                    "Failed to replace existing file: {}",
                    self.path.display()
                ))?;
                fs::rename(&temp, &self.path).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    self.path.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), self.path.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent);
        }

        debug!(path = %self.path.display(), entries = entries.len(), "Store saved atomically");
        Ok(())
    }
}

impl HostStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned()).as_deref() != Some(value)
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            changed
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}

fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("store");
    let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
    target.with_file_name(tmp_name)
}
