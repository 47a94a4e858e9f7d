use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SERVICE_NAME: &str = "slotbook";

/// Keychain account under which the serialized token pair is kept.
/// Both tokens live in one entry so a write replaces them together.
const SESSION_ACCOUNT: &str = "session";

/// Access/refresh token pair issued by `/auth/login` and `/auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens must never end up in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// How session credentials travel with each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialMode {
    /// Tokens held in a `CredentialStore`, sent as `Authorization: Bearer`.
    #[default]
    #[serde(rename = "bearer")]
    BearerToken,
    /// Server-managed session cookie kept in the transport's cookie jar.
    #[serde(rename = "cookie")]
    SessionCookie,
}

impl FromStr for CredentialMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" | "token" | "bearer_token" => Ok(CredentialMode::BearerToken),
            "cookie" | "session" | "session_cookie" => Ok(CredentialMode::SessionCookie),
            other => Err(format!("Unknown credential mode: {}", other)),
        }
    }
}

#[derive(Error, Debug)]
pub enum CredentialStoreError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored credential is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Credential store lock poisoned")]
    Poisoned,
}

/// Persistent storage for the current session credential.
///
/// Implementations must make `write` and `clear` affect both tokens at once:
/// a reader never observes a new access token next to an old refresh token.
pub trait CredentialStore: Send + Sync {
    /// Current credential, or `None` when logged out.
    fn read(&self) -> Result<Option<Credential>, CredentialStoreError>;

    /// Replace the stored credential wholesale.
    fn write(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    /// Remove both tokens.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Process-local store. Used in session-cookie mode, where nothing needs
/// persisting, and in tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> Result<Option<Credential>, CredentialStoreError> {
        let guard = self.inner.lock().map_err(|_| CredentialStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn write(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let mut guard = self.inner.lock().map_err(|_| CredentialStoreError::Poisoned)?;
        *guard = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let mut guard = self.inner.lock().map_err(|_| CredentialStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Store the token pair in the OS keychain.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, CredentialStoreError> {
        Ok(Entry::new(&self.service, SESSION_ACCOUNT)?)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn read(&self) -> Result<Option<Credential>, CredentialStoreError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(serde_json::from_str(&secret)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let secret = serde_json::to_string(credential)?;
        self.entry()?.set_password(&secret)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
