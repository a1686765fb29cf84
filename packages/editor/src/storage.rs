//! Persistence for the serialized style snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Single-key, whole-value storage of JSON text
pub trait Storage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write_raw(&mut self, key: &str, json: &str) -> Result<(), StorageError>;
}

/// In-memory storage (for testing, temp docs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn write_raw(&mut self, key: &str, json: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), json.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write_raw(&mut self, key: &str, json: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StorageError::Io { path, source }
        };

        std::fs::create_dir_all(&self.dir).map_err(io(&self.dir))?;

        // Write next to the target and rename so readers never see half a snapshot
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&staging, json).map_err(io(&staging))?;
        std::fs::rename(&staging, &path).map_err(io(&path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read_raw("style").unwrap(), None);

        storage.write_raw("style", "{}").unwrap();
        assert_eq!(storage.read_raw("style").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read_raw("CSLEDIT_cslData").unwrap(), None);
        storage.write_raw("CSLEDIT_cslData", r#"{"name":"style"}"#).unwrap();
        storage.write_raw("CSLEDIT_cslData", r#"{"name":"locale"}"#).unwrap();

        assert_eq!(
            storage.read_raw("CSLEDIT_cslData").unwrap().as_deref(),
            Some(r#"{"name":"locale"}"#)
        );
        assert!(dir.path().join("nested/CSLEDIT_cslData.json").exists());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.write_raw("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.read_raw(""), Err(StorageError::InvalidKey(_))));
    }
}
