//! Durable key-value persistence for NoteDesk
//!
//! The editor keeps everything that must survive a restart (the file
//! index and user settings) in one JSON file under the platform config
//! directory. Access goes through the [`IndexGateway`] trait so the
//! synchronizer and settings can be tested against an in-memory store.
//!
//! The store is schemaless at this layer: values are raw JSON, an absent
//! key reads as `None`, and callers own the shape of what they put in.

use crate::error::{Error, Result};
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "notedesk";

/// Storage file name
const STORE_FILE_NAME: &str = "storage.json";

/// Backup storage file name (used during atomic writes)
const STORE_BACKUP_NAME: &str = "storage.json.bak";

/// Key under which the file index snapshot is stored
pub const FILES_KEY: &str = "files";

/// Key under which the user-chosen save directory is stored
pub const SAVE_LOCATION_KEY: &str = "saved_file_location";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// Returns the appropriate directory based on the operating system:
/// - **Windows**: `%APPDATA%\notedesk\`
/// - **macOS**: `~/Library/Application Support/notedesk/`
/// - **Linux**: `~/.config/notedesk/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be
/// determined (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the storage file.
pub fn get_store_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(STORE_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Durable key-value storage for file metadata and settings.
///
/// An absent key is not an error; it reads as `None` and callers treat it
/// as "empty." No schema versioning is assumed at this layer.
pub trait IndexGateway {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON File Store
// ─────────────────────────────────────────────────────────────────────────────

/// File-backed key-value store, one pretty-printed JSON object per file.
///
/// Writes are atomic: the updated document is written to a backup file
/// first, then renamed over the original, matching how the editor saves
/// its other configuration.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Open a store at an explicit file path. The file does not need to
    /// exist yet; it is created on the first `set`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Open the store at the default platform location
    /// (`<config dir>/notedesk/storage.json`).
    pub fn at_default_location() -> Result<Self> {
        let path = get_store_path()?;
        debug!("Settings store location: {}", path.display());
        Ok(Self::new(path))
    }

    /// The backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the whole document. A missing or empty file reads as an
    /// empty object.
    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            debug!("Store file not found at {}, treating as empty", self.path.display());
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| Error::IndexLoad {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::IndexParse {
                message: format!("expected a JSON object at top level, found {}", other),
                source: None,
            }),
        }
    }

    /// Write the whole document atomically (backup file, then rename).
    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let parent = self.path.parent().ok_or(Error::ConfigDirNotFound)?;
        if !parent.exists() {
            debug!("Creating store directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| Error::IndexSave {
                path: parent.to_path_buf(),
                source: Box::new(e),
            })?;
        }

        let json = serde_json::to_string_pretty(document).map_err(|e| Error::IndexSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        let backup = parent.join(STORE_BACKUP_NAME);
        fs::write(&backup, &json).map_err(|e| Error::IndexSave {
            path: backup.clone(),
            source: Box::new(e),
        })?;
        fs::rename(&backup, &self.path).map_err(|e| Error::IndexSave {
            path: self.path.clone(),
            source: Box::new(e),
        })?;

        info!("Settings store saved to {}", self.path.display());
        Ok(())
    }
}

impl IndexGateway for JsonSettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory stand-in for the settings store, used in tests.
///
/// Clones share the same backing map; a test keeps one handle and wires a
/// boxed copy into the synchronizer. Writes can be failed on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexGateway {
    inner: Arc<Mutex<MemoryIndexInner>>,
}

#[derive(Debug, Default)]
struct MemoryIndexInner {
    values: BTreeMap<String, Value>,
    write_count: usize,
    fail_sets: bool,
}

impl MemoryIndexGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many `set` calls have been applied.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().write_count
    }

    pub fn set_fail_sets(&self, fail: bool) {
        self.inner.lock().unwrap().fail_sets = fail;
    }
}

impl IndexGateway for MemoryIndexGateway {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.inner.lock().unwrap().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_sets {
            return Err(Error::IndexSave {
                path: PathBuf::from("<memory>"),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "injected set failure",
                )),
            });
        }
        inner.values.insert(key.to_string(), value);
        inner.write_count += 1;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> JsonSettingsStore {
        JsonSettingsStore::new(temp.path().join(STORE_FILE_NAME))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Platform directory tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_get_config_dir_returns_path() {
        let result = get_config_dir();
        assert!(result.is_ok());
        assert!(result.unwrap().to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_get_store_path() {
        let path = get_store_path().unwrap();
        assert!(path.to_string_lossy().contains(STORE_FILE_NAME));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // JSON file store tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_absent_file_reads_as_absent_key() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.get(FILES_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        store
            .set(SAVE_LOCATION_KEY, json!("/docs"))
            .unwrap();

        assert_eq!(store.get(SAVE_LOCATION_KEY).unwrap(), Some(json!("/docs")));
    }

    #[test]
    fn test_set_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(STORE_FILE_NAME);

        JsonSettingsStore::new(path.clone())
            .set(FILES_KEY, json!({"a": 1}))
            .unwrap();

        let reopened = JsonSettingsStore::new(path);
        assert_eq!(reopened.get(FILES_KEY).unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        store.set(FILES_KEY, json!({})).unwrap();
        store.set(SAVE_LOCATION_KEY, json!("/docs")).unwrap();

        assert_eq!(store.get(FILES_KEY).unwrap(), Some(json!({})));
        assert_eq!(store.get(SAVE_LOCATION_KEY).unwrap(), Some(json!("/docs")));
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "").unwrap();

        assert_eq!(store.get(FILES_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "{ invalid json }").unwrap();

        assert!(matches!(
            store.get(FILES_KEY),
            Err(Error::IndexParse { .. })
        ));
    }

    #[test]
    fn test_non_object_top_level_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert!(matches!(
            store.get(FILES_KEY),
            Err(Error::IndexParse { .. })
        ));
    }

    #[test]
    fn test_set_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("deep").join(STORE_FILE_NAME);
        let store = JsonSettingsStore::new(nested.clone());

        store.set(FILES_KEY, json!({})).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_no_backup_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        store.set(FILES_KEY, json!({})).unwrap();
        assert!(!temp.path().join(STORE_BACKUP_NAME).exists());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Memory store tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryIndexGateway::new();
        store.set(FILES_KEY, json!({})).unwrap();
        store.set(FILES_KEY, json!({"a": 1})).unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get(FILES_KEY).unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_memory_store_injected_failure() {
        let store = MemoryIndexGateway::new();
        store.set_fail_sets(true);

        assert!(matches!(
            store.set(FILES_KEY, json!({})),
            Err(Error::IndexSave { .. })
        ));
        assert_eq!(store.write_count(), 0);
    }
}
