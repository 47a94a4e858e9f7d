use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credentials::{Credential, CredentialStore, CredentialStoreError};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    credential: Credential,
    saved_at: DateTime<Utc>,
}

/// Credential store backed by a JSON file.
///
/// Writes go to a temporary sibling first and are renamed into place, so the
/// file always holds either the old pair or the new pair.
pub struct FileCredentialStore {
    dir: PathBuf,
    // Serializes writers within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// When the stored credential was last written, if any.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, CredentialStoreError> {
        Ok(self.load()?.map(|s| s.saved_at))
    }

    fn load(&self) -> Result<Option<SessionFile>, CredentialStoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_private(path: &Path, contents: &str) -> Result<(), CredentialStoreError> {
        std::fs::write(path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn read(&self) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.load()?.map(|s| s.credential))
    }

    fn write(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().map_err(|_| CredentialStoreError::Poisoned)?;
        std::fs::create_dir_all(&self.dir)?;

        let contents = serde_json::to_string_pretty(&SessionFile {
            credential: credential.clone(),
            saved_at: Utc::now(),
        })?;

        let tmp = self.dir.join(format!("{}.tmp", SESSION_FILE));
        Self::write_private(&tmp, &contents)?;
        std::fs::rename(&tmp, self.path())?;
        debug!(path = %self.path().display(), "Session credential saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().map_err(|_| CredentialStoreError::Poisoned)?;
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "Session credential removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested"));

        assert!(store.read().unwrap().is_none());
        assert!(store.saved_at().unwrap().is_none());

        store.write(&Credential::new("access", "refresh")).unwrap();
        assert_eq!(store.read().unwrap(), Some(Credential::new("access", "refresh")));
        assert!(store.saved_at().unwrap().is_some());

        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_clear_without_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.read(), Err(CredentialStoreError::Corrupt(_))));
    }

    #[test]
    fn test_file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.write(&Credential::new("a", "r")).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![SESSION_FILE.to_string()]);
    }
}
