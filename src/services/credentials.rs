//! Durable credential storage.
//!
//! The session credential is persisted as a flat JSON object under fixed
//! keys so a restarted console can restore it without asking again. The
//! password is stored in plain text; the backend's trust model is a shared
//! operator password, not per-user secrets.
//!
//! The OS keychain (`keyring`) is not used: the store has to be a plain file
//! under fixed keys that also works on headless hosts.

use crate::error::AppError;
use crate::models::Credential;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Key for the authenticated flag.
pub const AUTHENTICATED_KEY: &str = "authenticated";

/// Key for the username.
pub const USERNAME_KEY: &str = "username";

/// Key for the password.
pub const PASSWORD_KEY: &str = "password";

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a previously authenticated credential.
    ///
    /// # Returns
    /// The credential if the flag is set and both fields are non-empty,
    /// `None` otherwise (including when nothing was ever stored).
    pub fn load(&self) -> Result<Option<Credential>, AppError> {
        let entries = match self.read_entries()? {
            Some(entries) => entries,
            None => return Ok(None),
        };

        let get = |key: &str| entries.get(key).and_then(Value::as_str).unwrap_or_default();

        if get(AUTHENTICATED_KEY) != "true" {
            return Ok(None);
        }

        let credential = Credential::new(get(USERNAME_KEY), get(PASSWORD_KEY));
        Ok(credential.is_complete().then_some(credential))
    }

    /// Persist a credential and set the authenticated flag.
    pub fn save(&self, credential: &Credential) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::credential_storage(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let mut entries = Map::new();
        entries.insert(AUTHENTICATED_KEY.to_string(), Value::from("true"));
        entries.insert(USERNAME_KEY.to_string(), Value::from(credential.username.as_str()));
        entries.insert(PASSWORD_KEY.to_string(), Value::from(credential.password.as_str()));

        let text = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.path, text)
            .map_err(|e| AppError::credential_storage(format!("Failed to store credential: {}", e)))
    }

    /// Remove the persisted credential.
    ///
    /// This operation is idempotent - clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to clear credential: {}",
                e
            ))),
        }
    }

    fn read_entries(&self) -> Result<Option<Map<String, Value>>, AppError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::credential_storage(format!(
                    "Failed to read credential: {}",
                    e
                )))
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(entries)) => Ok(Some(entries)),
            // A corrupt store is treated as logged out rather than fatal.
            _ => {
                log::warn!("[session] Ignoring unreadable store at {}", self.path.display());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/session.json"));

        store.save(&Credential::new("admin", "hunter2")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, Credential::new("admin", "hunter2"));

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[AUTHENTICATED_KEY], "true");
        assert_eq!(raw[USERNAME_KEY], "admin");
    }

    #[test]
    fn test_load_missing_store() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_requires_flag_and_both_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = CredentialStore::new(&path);

        std::fs::write(&path, r#"{"authenticated":"false","username":"a","password":"b"}"#)
            .unwrap();
        assert!(store.load().unwrap().is_none());

        std::fs::write(&path, r#"{"authenticated":"true","username":"a","password":""}"#).unwrap();
        assert!(store.load().unwrap().is_none());

        std::fs::write(&path, "garbage").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("session.json"));

        store.save(&Credential::new("admin", "hunter2")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
