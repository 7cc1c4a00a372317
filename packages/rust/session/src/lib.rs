//! Session identifier persistence.
//!
//! The [`SessionStore`] resolves a stable [`SessionId`] for this client
//! installation: the first call generates a random v4 UUID and persists it
//! through a [`KeyValueStore`] backend; every later call (including across
//! process restarts with the file backend) returns the same value.
//!
//! Resolution never fails. If the backend cannot be read or written, the
//! store degrades to a fresh in-memory identifier that lives for the
//! process lifetime only.

mod store;

use std::sync::OnceLock;

use tracing::{debug, warn};

use docauditor_shared::SessionId;

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Key under which the session identifier is persisted.
const SESSION_ID_KEY: &str = "session-id";

/// Resolves and caches the per-installation session identifier.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
    // Read-only process-wide state after first resolution.
    cached: OnceLock<SessionId>,
}

impl SessionStore {
    /// Create a session store over the given persistence backend.
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            cached: OnceLock::new(),
        }
    }

    /// Create a session store persisting under `dir` (one file per key).
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Box::new(FileStore::new(dir)))
    }

    /// Get the session identifier, generating and persisting one on first use.
    ///
    /// Infallible: a broken backend yields a non-persisted identifier
    /// that stays stable for the rest of the process.
    pub fn get_or_create(&self) -> SessionId {
        self.cached.get_or_init(|| self.resolve()).clone()
    }

    fn resolve(&self) -> SessionId {
        match self.backend.get(SESSION_ID_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<SessionId>() {
                Ok(id) => {
                    debug!(%id, "loaded persisted session id");
                    return id;
                }
                Err(e) => {
                    warn!(error = %e, "persisted session id is malformed, regenerating");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "session storage unreadable, using in-memory id");
                return SessionId::new();
            }
        }

        let id = SessionId::new();
        if let Err(e) = self.backend.set(SESSION_ID_KEY, &id.to_string()) {
            warn!(error = %e, "could not persist session id, it will not survive restart");
        } else {
            debug!(%id, "generated and persisted new session id");
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_within_one_store() {
        let store = SessionStore::new(Box::new(MemoryStore::new()));
        let first = store.get_or_create();
        let second = store.get_or_create();
        assert_eq!(first, second);
    }

    #[test]
    fn persisted_across_store_instances() {
        let dir = tempfile::tempdir().expect("tempdir");

        let first = SessionStore::in_dir(dir.path()).get_or_create();
        let second = SessionStore::in_dir(dir.path()).get_or_create();
        assert_eq!(first, second);
    }

    #[test]
    fn independent_scopes_get_distinct_ids() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");

        let id_a = SessionStore::in_dir(a.path()).get_or_create();
        let id_b = SessionStore::in_dir(b.path()).get_or_create();
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn malformed_persisted_id_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileStore::new(dir.path());
        backend.set(SESSION_ID_KEY, "not-a-uuid").expect("seed");

        let store = SessionStore::in_dir(dir.path());
        let id = store.get_or_create();
        // The replacement is persisted and stable afterwards.
        assert_eq!(SessionStore::in_dir(dir.path()).get_or_create(), id);
    }

    #[test]
    fn unwritable_backend_still_yields_stable_id() {
        struct Broken;
        impl KeyValueStore for Broken {
            fn get(&self, _key: &str) -> docauditor_shared::Result<Option<String>> {
                Err(docauditor_shared::AuditError::Storage("read failed".into()))
            }
            fn set(&self, _key: &str, _value: &str) -> docauditor_shared::Result<()> {
                Err(docauditor_shared::AuditError::Storage("write failed".into()))
            }
        }

        let store = SessionStore::new(Box::new(Broken));
        let first = store.get_or_create();
        let second = store.get_or_create();
        assert_eq!(first, second);
    }
}
