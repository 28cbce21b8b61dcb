//! Durable session storage.
//!
//! A session survives restarts as three string entries in a key/value
//! store: the user record as JSON, the literal `"true"` flag, and the
//! bearer token. [`FileStorage`] keeps them in a JSON object on disk;
//! [`MemoryStorage`] keeps them in memory for tests and throwaway sessions.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use akario_core::User;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

/// Storage keys for the persisted session.
pub mod keys {
    /// Key for the serialized user record.
    pub const USER: &str = "user";

    /// Key for the authenticated flag; only the literal `"true"` counts.
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";

    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Every session key, in purge order.
    pub const ALL: [&str; 3] = [USER, IS_AUTHENTICATED, TOKEN];
}

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session data: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value storage that outlives the process.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated identity and its token.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Session {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    #[must_use]
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: SecretString::from(token.into()),
        }
    }

    /// Write all three session keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be encoded or a write fails.
    pub fn save(&self, storage: &dyn SessionStorage) -> Result<(), StorageError> {
        let user = serde_json::to_string(&self.user)?;
        storage.set(keys::USER, &user)?;
        storage.set(keys::IS_AUTHENTICATED, "true")?;
        storage.set(keys::TOKEN, self.token.expose_secret())
    }

    /// Read a complete session.
    ///
    /// Returns `Ok(None)` unless the user record, the `"true"` flag and a
    /// non-empty token are all present and the user record parses.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store itself cannot be read.
    pub fn load(storage: &dyn SessionStorage) -> Result<Option<Self>, StorageError> {
        let user = storage.get(keys::USER)?;
        let flag = storage.get(keys::IS_AUTHENTICATED)?;
        let token = storage.get(keys::TOKEN)?;

        let (Some(user), Some(flag), Some(token)) = (user, flag, token) else {
            return Ok(None);
        };
        if flag != "true" || token.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<User>(&user) {
            Ok(user) => Ok(Some(Self::new(user, token))),
            Err(e) => {
                warn!(error = %e, "Stored user record does not parse");
                Ok(None)
            }
        }
    }

    /// Remove all three session keys.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError`; later keys are still attempted.
    pub fn purge(storage: &dyn SessionStorage) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in keys::ALL {
            if let Err(e) = storage.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Whether any session key is present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub fn any_present(storage: &dyn SessionStorage) -> Result<bool, StorageError> {
        for key in keys::ALL {
            if storage.get(key)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Session entries in a single JSON object file.
///
/// Writes go through a temporary file and a rename. A corrupt file fails
/// reads but is overwritten by the next write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current entries, plus whether a corrupt file was discarded and so
    /// needs rewriting.
    fn read_map_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_map() {
            Ok(map) => Ok((map, false)),
            Err(StorageError::Json(e)) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt session file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut map, _) = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut map, discarded) = self.read_map_for_write()?;
        if map.remove(key).is_some() || discarded {
            return self.write_map(&map);
        }
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use akario_core::{Role, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new("u1"),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            role: Role::User,
        }
    }

    fn temp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("akario-session-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_save_writes_three_keys() {
        let storage = MemoryStorage::new();
        Session::new(user(), "tok").save(&storage).unwrap();
        assert_eq!(storage.len(), 3);
        assert_eq!(
            storage.get(keys::IS_AUTHENTICATED).unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_load_requires_all_keys() {
        let storage = MemoryStorage::with_entries([
            (keys::USER, r#"{"_id":"u1","name":"Asha","email":"a@x.io","role":"user"}"#),
            (keys::IS_AUTHENTICATED, "true"),
        ]);
        assert!(Session::load(&storage).unwrap().is_none());

        storage.set(keys::TOKEN, "tok").unwrap();
        let session = Session::load(&storage).unwrap().unwrap();
        assert_eq!(session.user.id.as_str(), "u1");
    }

    #[test]
    fn test_load_rejects_flag_other_than_true() {
        let storage = MemoryStorage::new();
        Session::new(user(), "tok").save(&storage).unwrap();
        storage.set(keys::IS_AUTHENTICATED, "yes").unwrap();
        assert!(Session::load(&storage).unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_unparseable_user() {
        let storage = MemoryStorage::with_entries([
            (keys::USER, "{not json"),
            (keys::IS_AUTHENTICATED, "true"),
            (keys::TOKEN, "tok"),
        ]);
        assert!(Session::load(&storage).unwrap().is_none());
    }

    #[test]
    fn test_purge_removes_everything() {
        let storage = MemoryStorage::new();
        Session::new(user(), "tok").save(&storage).unwrap();
        Session::purge(&storage).unwrap();
        assert!(storage.is_empty());
        assert!(!Session::any_present(&storage).unwrap());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(user(), "super-secret-token");
        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-token"));
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let path = temp_file();
        Session::new(user(), "tok")
            .save(&FileStorage::new(&path))
            .unwrap();

        let reopened = FileStorage::new(&path);
        let session = Session::load(&reopened).unwrap().unwrap();
        assert_eq!(session.user, user());
        assert_eq!(session.token.expose_secret(), "tok");

        Session::purge(&reopened).unwrap();
        assert!(Session::load(&FileStorage::new(&path)).unwrap().is_none());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_storage_corrupt_file_overwritten_by_write() {
        let path = temp_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "][").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get(keys::USER), Err(StorageError::Json(_))));
        Session::purge(&storage).unwrap();
        assert_eq!(storage.get(keys::USER).unwrap(), None);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
