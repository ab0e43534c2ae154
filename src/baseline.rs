//! On-disk baseline image set for visual targets.
//!
//! Each target owns three artifacts under its own directory: `baseline`
//! (last accepted reference), `prev` (the baseline it replaced) and `diff`
//! (latest annotated comparison). Only one generation of history is kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const BASELINE_FILE: &str = "baseline.png";
const PREV_FILE: &str = "prev.png";
const DIFF_FILE: &str = "diff.png";

/// Manages the per-target baseline/prev/diff artifact set
#[derive(Debug, Clone)]
pub struct BaselineStore {
    root: PathBuf,
}

impl BaselineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.target_dir(name).join(BASELINE_FILE)
    }

    pub fn prev_path(&self, name: &str) -> PathBuf {
        self.target_dir(name).join(PREV_FILE)
    }

    pub fn diff_path(&self, name: &str) -> PathBuf {
        self.target_dir(name).join(DIFF_FILE)
    }

    pub fn has_baseline(&self, name: &str) -> bool {
        self.baseline_path(name).exists()
    }

    /// Persist `captured` as the baseline when none exists yet.
    ///
    /// Returns `true` on a first capture, in which case no change pipeline
    /// should run for this cycle.
    pub fn ensure_baseline(&self, name: &str, captured: &[u8]) -> io::Result<bool> {
        let path = self.baseline_path(name);
        if path.exists() {
            return Ok(false);
        }
        write_artifact(&path, captured)?;
        debug!(target_name = name, path = %path.display(), "baseline initialized");
        Ok(true)
    }

    pub fn read_baseline(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.baseline_path(name))
    }

    /// Rotate the artifact set for a confirmed change: `prev` takes the old
    /// baseline bytes, `baseline` the new capture, `diff` the annotated
    /// render, written in that order.
    ///
    /// There is no multi-file transaction; a failure partway leaves an
    /// intermediate state. Retrying the whole commit with the same values
    /// is safe because each write independently overwrites its file.
    pub fn commit_change(
        &self,
        name: &str,
        old_baseline: &[u8],
        new_capture: &[u8],
        annotated: &[u8],
    ) -> io::Result<()> {
        write_artifact(&self.prev_path(name), old_baseline)?;
        write_artifact(&self.baseline_path(name), new_capture)?;
        write_artifact(&self.diff_path(name), annotated)?;
        debug!(target_name = name, "baseline rotated");
        Ok(())
    }
}

fn write_artifact(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capture_initializes_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());

        let first = store.ensure_baseline("shop", b"capture-1").unwrap();
        assert!(first);
        assert!(store.has_baseline("shop"));
        assert_eq!(store.read_baseline("shop").unwrap(), b"capture-1");
        assert!(!store.prev_path("shop").exists());
        assert!(!store.diff_path("shop").exists());
    }

    #[test]
    fn test_second_capture_is_not_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());

        assert!(store.ensure_baseline("shop", b"capture-1").unwrap());
        assert!(!store.ensure_baseline("shop", b"capture-2").unwrap());
        // An existing baseline is never overwritten by ensure_baseline
        assert_eq!(store.read_baseline("shop").unwrap(), b"capture-1");
    }

    #[test]
    fn test_commit_rotates_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());

        store.ensure_baseline("shop", b"old-baseline").unwrap();
        let old = store.read_baseline("shop").unwrap();
        store
            .commit_change("shop", &old, b"new-capture", b"annotated")
            .unwrap();

        assert_eq!(fs::read(store.prev_path("shop")).unwrap(), b"old-baseline");
        assert_eq!(store.read_baseline("shop").unwrap(), b"new-capture");
        assert_eq!(fs::read(store.diff_path("shop")).unwrap(), b"annotated");
    }

    #[test]
    fn test_commit_retry_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());

        store.ensure_baseline("shop", b"old").unwrap();
        for _ in 0..2 {
            store.commit_change("shop", b"old", b"new", b"diff").unwrap();
        }
        assert_eq!(fs::read(store.prev_path("shop")).unwrap(), b"old");
        assert_eq!(store.read_baseline("shop").unwrap(), b"new");
    }

    #[test]
    fn test_targets_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = BaselineStore::new(dir.path());

        store.ensure_baseline("store", b"a").unwrap();
        store.ensure_baseline("california", b"b").unwrap();
        assert_eq!(store.read_baseline("store").unwrap(), b"a");
        assert_eq!(store.read_baseline("california").unwrap(), b"b");
    }
}
