//! Key-value persistence for repository state.
//!
//! The repository saves itself as one JSON document under a fixed key. Stores
//! only move whole documents; there is no partial update.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, TrackflowError};

/// Minimal get/set document store.
pub trait KeyValueStore {
    /// Read the document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Store that keeps each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut buf = String::new();
        File::open(&path)?.read_to_string(&mut buf)?;
        Ok(Some(serde_json::from_str(&buf)?))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(&value)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw string under a key, which need not be valid JSON.
    ///
    /// Invalid text is kept as a JSON string so that readers expecting an
    /// object see a malformed document.
    #[cfg(test)]
    pub fn insert_raw(&mut self, key: &str, raw: &str) {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        self.entries.insert(key.to_string(), value);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Copy the file behind `key` into `<dir>/backup/` with a timestamped name.
pub fn create_backup(store: &FileStore, key: &str) -> Result<PathBuf> {
    let source = store.path_for(key);
    if !source.exists() {
        return Err(TrackflowError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("nothing to back up at {}", source.display()),
        )));
    }

    let backup_dir = store.dir().join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let backup_path = backup_dir.join(format!("{}_{}.json", timestamp, key));
    fs::copy(&source, &backup_path)?;
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_round_trips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));
        assert!(store.get("k").unwrap().is_none());

        store.set("k", json!({"a": [1, 2, 3]})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": [1, 2, 3]})));
        assert!(!store.path_for("k").with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(store.path_for("k"), "{not json").unwrap();
        assert!(matches!(store.get("k"), Err(TrackflowError::Json(_))));
    }

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.set("k", json!(1)).unwrap();
        store.set("k", json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn backup_copies_current_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("boards", json!({"x": 1})).unwrap();

        let backup = create_backup(&store, "boards").unwrap();
        assert!(backup.starts_with(dir.path().join("backup")));
        let copied: Value = serde_json::from_str(&fs::read_to_string(backup).unwrap()).unwrap();
        assert_eq!(copied, json!({"x": 1}));
    }

    #[test]
    fn backup_without_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(create_backup(&store, "boards").is_err());
    }
}
