//! Key-value save storage.
//!
//! The progression store needs nothing more than `get` and `set` on raw
//! bytes under a fixed key. Two backends are provided: an in-memory map
//! (tests, harnesses, the fallback when nothing durable is available) and
//! a directory of JSON files.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Minimal blob store contract. No transactions, no queries.
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// In-memory store with an availability switch.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    available: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            available: true,
            writes: 0,
        }
    }

    /// While unavailable, every `get` and `set` fails.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Place raw bytes directly, bypassing availability.
    pub fn seed(&mut self, key: &str, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.to_string(), value.into());
    }

    /// Read raw bytes directly, bypassing availability.
    pub fn peek(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.entries.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

fn io_err(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl SaveStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_err(key))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err(key))?;
        fs::rename(&tmp, &path).map_err(io_err(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemoryStore::new();
        store.seed("k", "old");
        store.set_available(false);
        assert!(matches!(store.get("k"), Err(StorageError::Unavailable)));
        assert!(matches!(store.set("k", b"new"), Err(StorageError::Unavailable)));
        assert_eq!(store.peek("k"), Some(&b"old"[..]));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("saves"));
        assert!(store.get("fractal-rpg.save.v1").unwrap().is_none());
        store.set("fractal-rpg.save.v1", b"{}").unwrap();
        store.set("fractal-rpg.save.v1", b"{\"xp\":1}").unwrap();
        assert_eq!(
            store.get("fractal-rpg.save.v1").unwrap(),
            Some(b"{\"xp\":1}".to_vec())
        );
        assert!(!store.path_for("fractal-rpg.save.v1").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_sanitises_keys() {
        let store = FileStore::new("/tmp/x");
        let path = store.path_for("../evil/key");
        assert_eq!(path, PathBuf::from("/tmp/x/.._evil_key.json"));
    }

    #[test]
    fn test_file_store_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a dir").unwrap();
        let mut store = FileStore::new(blocker.join("saves"));
        assert!(matches!(store.set("k", b"v"), Err(StorageError::Io { .. })));
    }
}
