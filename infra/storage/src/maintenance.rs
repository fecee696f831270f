use crate::error::StorageError;
use crate::host::HostStore;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

pub(crate) const TMP_MARKER: &str = ".mxptmp.";
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Deletes every host key that starts with `prefix` and returns how many were removed.
///
/// The key list is snapshotted before the first deletion, so removals cannot shift the
/// enumeration. An empty prefix deletes nothing.
///
/// # Errors
///
/// Propagates host failures from enumeration or deletion. Keys deleted before the failure stay
/// deleted.
pub fn delete_by_prefix<H>(host: &H, prefix: &str) -> Result<usize, StorageError>
where
    H: HostStore + ?Sized,
{
    if prefix.is_empty() {
        return Ok(0);
    }

    let doomed: Vec<String> =
        host.keys()?.into_iter().filter(|key| key.starts_with(prefix)).collect();

    for key in &doomed {
        host.delete(key)?;
    }

    debug!(prefix, removed = doomed.len(), "Scope deleted");
    Ok(doomed.len())
}

/// Removes orphaned temp files left next to `target` by interrupted writes.
pub(crate) fn purge_tmp(target: &Path) {
    let Some(dir) = target.parent() else {
        return;
    };
    let Some(stem) = target.file_name().and_then(|name| name.to_str()) else {
        return;
    };

    let (removed, failed) = remove_stale(dir, stem, SystemTime::now(), STALE_AFTER);
    if removed > 0 || failed > 0 {
        info!(removed, failed, "Cleaned up temporary files");
    }
}

fn remove_stale(dir: &Path, stem: &str, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
        .filter(|entry| is_tmp_of(entry, stem) && is_stale(entry, now, threshold))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Temp file cleanup failed");
                failed += 1;
            },
        });

    (removed, failed)
}

fn is_tmp_of(entry: &DirEntry, stem: &str) -> bool {
    entry.file_type().is_file()
        && entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_prefix(stem))
            .is_some_and(|rest| rest.starts_with(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .map_or(true, |age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryStore;

    fn seeded() -> MemoryStore {
        [("_NS_g1a", "1"), ("_NS_g1b", "2"), ("_NS_g2a", "3"), ("other", "4"), ("x_NS_g1", "5")]
            .into_iter()
            .collect()
    }

    #[test]
    fn deletes_only_prefixed_keys() {
        let host = seeded();
        assert_eq!(delete_by_prefix(&host, "_NS_g1").unwrap(), 2);

        let mut left = host.keys().unwrap();
        left.sort();
        assert_eq!(left, vec!["_NS_g2a", "other", "x_NS_g1"]);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let host = seeded();
        assert_eq!(delete_by_prefix(&host, "_ns_").unwrap(), 0);
        assert_eq!(host.len(), 5);
    }

    #[test]
    fn empty_prefix_is_noop() {
        let host = seeded();
        assert_eq!(delete_by_prefix(&host, "").unwrap(), 0);
        assert_eq!(host.len(), 5);
    }

    #[test]
    fn stale_tmp_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("store.json");
        let orphan = dir.path().join("store.json.mxptmp.1.1");
        let foreign = dir.path().join("other.json.mxptmp.1.1");
        std::fs::write(&orphan, b"{}").unwrap();
        std::fs::write(&foreign, b"{}").unwrap();

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(dir.path(), "store.json", later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(!orphan.exists());
        assert!(foreign.exists());
        assert!(!target.exists());
    }

    #[test]
    fn fresh_tmp_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let pending = dir.path().join("store.json.mxptmp.1.1");
        std::fs::write(&pending, b"{}").unwrap();

        let (removed, _) = remove_stale(dir.path(), "store.json", SystemTime::now(), STALE_AFTER);
        assert_eq!(removed, 0);
        assert!(pending.exists());
    }
}
