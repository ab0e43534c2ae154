//! Persistent mapping from target URL to last observed content hash.
//!
//! Loaded once at process start, mutated in memory by every monitor task,
//! and flushed exactly once during graceful shutdown. Changes between the
//! last flush and a crash are lost; that is an accepted weakness, not a
//! recovery path.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use crate::types::WatchError;

/// Mutex-guarded url → hash map with an explicit save point
#[derive(Debug)]
pub struct HashStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl HashStore {
    /// Load the store from disk. A missing file is an empty store, not an
    /// error; a file that exists but fails to parse is.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WatchError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(WatchError::Io(e)),
        };
        info!(path = %path.display(), entries = entries.len(), "hash store loaded");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Create an empty store that will save to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, url: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("hash store lock poisoned")
            .get(url)
            .cloned()
    }

    pub fn set(&self, url: &str, hash: &str) {
        self.entries
            .lock()
            .expect("hash store lock poisoned")
            .insert(url.to_string(), hash.to_string());
    }

    /// Sorted copy of the current entries, taken under the lock
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .expect("hash store lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Flush the store to disk as pretty-printed JSON (2-space indent).
    /// Called once, at graceful shutdown.
    pub fn save(&self) -> Result<(), WatchError> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), entries = snapshot.len(), "hash store saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("hash store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
