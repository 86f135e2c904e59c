//! Visitor preference storage.
//!
//! The only preference today is the podcast player's mute flag. Reads fall
//! back to defaults when a key is absent, and writes persist immediately so
//! the choice survives a restart when the file backend is configured.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

/// Preference key for the podcast player mute flag.
const MUTED_KEY: &str = "player.muted";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to read preferences file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write preferences file: {0}")]
    Write(#[source] std::io::Error),
    #[error("preferences file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A key-value store for visitor preferences.
///
/// `get` returns `None` for unknown keys; callers supply the default. `set`
/// persists before returning on durable backends.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Volatile in-memory store, used when no preferences path is configured
/// and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }
}

/// Write-through JSON file store.
///
/// The whole map is rewritten on every set; preference writes are rare and
/// the file stays tiny.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, loading any existing file. A missing file is an
    /// empty store; a corrupt file is an error so bad state is noticed
    /// rather than silently wiped.
    pub fn open(path: PathBuf) -> Result<Self, PrefsError> {
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(PrefsError::Read(err)),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), PrefsError> {
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json).map_err(PrefsError::Write)
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let Ok(mut values) = self.values.lock() else {
            return;
        };
        values.insert(key.to_string(), value);
        if let Err(err) = self.persist(&values) {
            warn!(error = %err, path = %self.path.display(), "failed to persist preferences");
        }
    }
}

/// Handle to the preference store, shared across handlers.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Whether the podcast player is muted. Defaults to false.
    #[must_use]
    pub fn muted(&self) -> bool {
        self.store
            .get(MUTED_KEY)
            .is_some_and(|value| value == "true")
    }

    /// Set the mute flag. Persisted before this returns on durable stores.
    pub fn set_muted(&self, muted: bool) {
        self.store.set(MUTED_KEY, muted.to_string());
    }
}
