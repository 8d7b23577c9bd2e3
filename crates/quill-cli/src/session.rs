//! CLI session persistence with secure keychain storage.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use quill_core::auth::{AuthError, AuthResult, SessionPersistence};
use quill_core::Credential;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "quill-cli";
const KEYRING_SESSION_USERNAME: &str = "logged_quill_user";

/// Session store backed by the OS keyring.
///
/// A stored entry that no longer parses is discarded and loads as
/// `None`, the same as an absent entry.
#[derive(Debug, Clone, Default)]
pub struct KeyringSessionStore;

impl KeyringSessionStore {
    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry() -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, KEYRING_SESSION_USERNAME)
            .map_err(|error| AuthError::Storage(error.to_string()))
    }

    fn parse_stored(raw: &str) -> Option<Credential> {
        match serde_json::from_str(raw) {
            Ok(credential) => Some(credential),
            Err(error) => {
                tracing::warn!("Discarding unreadable stored session: {error}");
                None
            }
        }
    }
}

impl SessionPersistence for KeyringSessionStore {
    #[cfg(not(test))]
    fn load(&self) -> AuthResult<Option<Credential>> {
        let entry = Self::entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Self::parse_stored(&raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AuthError::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load(&self) -> AuthResult<Option<Credential>> {
        let store = Self::test_store();
        let guard = store
            .lock()
            .map_err(|error| AuthError::Storage(error.to_string()))?;
        Ok(guard
            .get(KEYRING_SESSION_USERNAME)
            .and_then(|raw| Self::parse_stored(raw)))
    }

    #[cfg(not(test))]
    fn save(&self, credential: &Credential) -> AuthResult<()> {
        let raw = serde_json::to_string(credential)?;
        Self::entry()?
            .set_password(&raw)
            .map_err(|error| AuthError::Storage(error.to_string()))?;
        Ok(())
    }

    #[cfg(test)]
    fn save(&self, credential: &Credential) -> AuthResult<()> {
        let raw = serde_json::to_string(credential)?;
        let store = Self::test_store();
        let mut guard = store
            .lock()
            .map_err(|error| AuthError::Storage(error.to_string()))?;
        guard.insert(KEYRING_SESSION_USERNAME.to_string(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear(&self) -> AuthResult<()> {
        let entry = Self::entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear(&self) -> AuthResult<()> {
        let store = Self::test_store();
        let mut guard = store
            .lock()
            .map_err(|error| AuthError::Storage(error.to_string()))?;
        guard.remove(KEYRING_SESSION_USERNAME);
        Ok(())
    }
}
