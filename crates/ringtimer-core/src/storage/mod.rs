//! Local single-device key-value storage.
//!
//! All persisted state -- the speaker session, household/group selection
//! and duck levels -- lives in one string-keyed store. [`FileStore`] is
//! the production backend (a JSON map under the app data dir);
//! [`MemoryStore`] backs tests and ephemeral shells.

pub mod keys;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// String-keyed local device storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and ephemeral shells.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }
}

/// JSON-file-backed store. Writes through on every mutation so the file
/// is the sole source of truth.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| StorageError::ParseFailed(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StorageError::OpenFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };
        Ok(Self { path, map })
    }

    /// Open the default store under the app data dir.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(data_dir()?.join("store.json"))
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.map)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                std::fs::write(&self.path, content).map_err(|e| e.to_string())
            });
        if let Err(message) = result {
            tracing::warn!(path = %self.path.display(), %message, "failed to persist store");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.map.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Returns `~/.config/ringtimer[-dev]/` based on RINGTIMER_ENV.
///
/// Set RINGTIMER_ENV=dev to use a separate development data directory.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RINGTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ringtimer-dev")
    } else {
        base_dir.join("ringtimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::OpenFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
