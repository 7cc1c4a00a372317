//! Key-value persistence backends for session state.
//!
//! The trait keeps session-identifier logic storage-agnostic: production
//! uses [`FileStore`] under the config directory, tests and the
//! storage-unavailable fallback use [`MemoryStore`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use docauditor_shared::{AuditError, Result};

/// Minimal key-value persistence capability.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// File-backed store: one file per key under a base directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily
    /// on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuditError::Storage(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AuditError::Storage(format!("{}: {e}", self.dir.display())))?;

        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| AuditError::Storage(format!("{}: {e}", path.display())))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and as the storage-unavailable fallback.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AuditError::Storage("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AuditError::Storage("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".into()));
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".into()));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        assert_eq!(store.get("session-id").unwrap(), None);
        store.set("session-id", "abc").unwrap();
        assert_eq!(store.get("session-id").unwrap(), Some("abc".into()));
    }

    #[test]
    fn file_store_creates_missing_dir_on_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("state");
        let store = FileStore::new(&nested);

        store.set("k", "v").unwrap();
        assert!(nested.join("k").exists());
    }
}
