//! Local filesystem key/value store for the desktop emulator.
//!
//! `FileKeyValueStore` implements [`KeyValueStore`] with a single JSON object
//! file (`{"volume": 40, "station_idx": 3}`). The whole map is rewritten on
//! every `set_i32`, which is fine for the two keys the radio persists.
//! Used when the `std` feature is enabled (emulator builds only).

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::storage::{KeyValueStore, StoreError};

/// A [`KeyValueStore`] backed by one JSON file.
///
/// # Example
/// ```no_run
/// use platform::storage_local::FileKeyValueStore;
/// use platform::KeyValueStore;
/// let store = FileKeyValueStore::open("/tmp/airwave-state.json").unwrap();
/// store.set_i32("volume", 40).unwrap();
/// ```
pub struct FileKeyValueStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, i32>>,
}

impl FileKeyValueStore {
    /// Open `path`, loading its contents. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the file exists but cannot be read,
    /// [`StoreError::Corrupt`] if it is not a JSON object of integers.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|_| StoreError::Corrupt)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(_) => return Err(StoreError::Io),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Io)?;
        Ok(values.get(key).copied())
    }

    fn set_i32(&self, key: &str, value: i32) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Io)?;
        values.insert(key.to_owned(), value);
        let text = serde_json::to_string_pretty(&*values).map_err(|_| StoreError::Corrupt)?;
        fs::write(&self.path, text).map_err(|_| StoreError::Io)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(tmp.path().join("state.json")).unwrap();
        assert_eq!(store.get_i32("volume").unwrap(), None);
    }

    #[test]
    fn set_then_reopen_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        {
            let store = FileKeyValueStore::open(&path).unwrap();
            store.set_i32("volume", 40).unwrap();
            store.set_i32("station_idx", 3).unwrap();
        }
        let store = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get_i32("volume").unwrap(), Some(40));
        assert_eq!(store.get_i32("station_idx").unwrap(), Some(3));
    }

    #[test]
    fn overwrite_keeps_latest() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(tmp.path().join("state.json")).unwrap();
        store.set_i32("volume", 10).unwrap();
        store.set_i32("volume", 55).unwrap();
        assert_eq!(store.get_i32("volume").unwrap(), Some(55));
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileKeyValueStore::open(&path),
            Err(StoreError::Corrupt)
        ));
    }

    #[test]
    fn non_integer_value_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, br#"{"volume": "loud"}"#).unwrap();
        assert!(matches!(
            FileKeyValueStore::open(&path),
            Err(StoreError::Corrupt)
        ));
    }
}
