//! Persistent per-account preferences.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use super::{AccountId, PrefixSet};

/// Errors raised by a preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preferences file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Key-value lookup for preferences that outlive the process.
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored prefixes for an account, if any were saved.
    fn get_prefixes(&self, account: AccountId) -> Result<Option<Vec<String>>, StoreError>;

    /// Saves the prefixes for an account.
    fn set_prefixes(&self, account: AccountId, prefixes: &PrefixSet) -> Result<(), StoreError>;
}

/// Preference store backed by a pretty-printed JSON file.
///
/// The file maps account ids to prefix lists:
///
/// ```json
/// { "12345": [".", "!"] }
/// ```
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    prefixes: Mutex<BTreeMap<String, Vec<String>>>,
}

impl JsonPreferenceStore {
    /// Opens the store, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let prefixes = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            prefixes: Mutex::new(prefixes),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, prefixes: &BTreeMap<String, Vec<String>>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(prefixes)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get_prefixes(&self, account: AccountId) -> Result<Option<Vec<String>>, StoreError> {
        let prefixes = self.prefixes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(prefixes.get(&account.to_string()).cloned())
    }

    fn set_prefixes(&self, account: AccountId, prefixes: &PrefixSet) -> Result<(), StoreError> {
        let mut stored = self.prefixes.lock().unwrap_or_else(PoisonError::into_inner);
        let key = account.to_string();

        let previous = stored.insert(key.clone(), prefixes.as_slice().to_vec());

        if let Err(e) = self.save(&stored) {
            // Rollback
            match previous {
                Some(old) => stored.insert(key, old),
                None => stored.remove(&key),
            };
            return Err(e);
        }

        Ok(())
    }
}

/// Preference store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    prefixes: Mutex<HashMap<AccountId, Vec<String>>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_prefixes(&self, account: AccountId) -> Result<Option<Vec<String>>, StoreError> {
        let prefixes = self.prefixes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(prefixes.get(&account).cloned())
    }

    fn set_prefixes(&self, account: AccountId, prefixes: &PrefixSet) -> Result<(), StoreError> {
        let mut stored = self.prefixes.lock().unwrap_or_else(PoisonError::into_inner);
        stored.insert(account, prefixes.as_slice().to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ubot-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        let account = AccountId(7);
        assert!(store.get_prefixes(account).unwrap().is_none());

        let set = PrefixSet::new(["!", "?"]).unwrap();
        store.set_prefixes(account, &set).unwrap();
        assert_eq!(
            store.get_prefixes(account).unwrap(),
            Some(vec!["!".to_owned(), "?".to_owned()])
        );
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);

        let store = JsonPreferenceStore::open(&path).unwrap();
        assert!(store.get_prefixes(AccountId(1)).unwrap().is_none());
    }

    #[test]
    fn test_json_store_persists_across_open() {
        let path = temp_path("persist");
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonPreferenceStore::open(&path).unwrap();
            let set = PrefixSet::new([",", "."]).unwrap();
            store.set_prefixes(AccountId(42), &set).unwrap();
        }

        let reopened = JsonPreferenceStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_prefixes(AccountId(42)).unwrap(),
            Some(vec![",".to_owned(), ".".to_owned()])
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_store_rolls_back_failed_write() {
        let path = std::env::temp_dir()
            .join(format!("ubot-{}-missing-dir", std::process::id()))
            .join("x")
            .join("prefs.json");

        let store = JsonPreferenceStore::open(&path).unwrap();
        let set = PrefixSet::new(["!"]).unwrap();

        assert!(matches!(
            store.set_prefixes(AccountId(1), &set),
            Err(StoreError::Io(_))
        ));
        assert!(store.get_prefixes(AccountId(1)).unwrap().is_none());
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonPreferenceStore::open(&path),
            Err(StoreError::Parse(_))
        ));

        let _ = std::fs::remove_file(&path);
    }
}
