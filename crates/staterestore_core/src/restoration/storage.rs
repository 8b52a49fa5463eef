//! Keyed restoration storage.
//!
//! Stand-in for the host-managed restoration store. The memory variant covers
//! warm handoffs and tests; the file variant keeps one file per key.

use super::{RestorationError, RestorationResult};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Byte storage addressed by string keys.
pub trait RestorationStorage {
    /// Returns stored bytes for `key`, or `None` when nothing is stored.
    fn read(&self, key: &str) -> RestorationResult<Option<Vec<u8>>>;
    /// Stores `bytes` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, bytes: &[u8]) -> RestorationResult<()>;
    /// Drops any value under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> RestorationResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRestorationStorage {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryRestorationStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl RestorationStorage for MemoryRestorationStorage {
    fn read(&self, key: &str) -> RestorationResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> RestorationResult<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RestorationResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage, one file per key.
#[derive(Debug, Clone)]
pub struct FileRestorationStorage {
    dir: PathBuf,
}

impl FileRestorationStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

fn storage_error(path: &Path, source: std::io::Error) -> RestorationError {
    RestorationError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

impl RestorationStorage for FileRestorationStorage {
    fn read(&self, key: &str) -> RestorationResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(&path, err)),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> RestorationResult<()> {
        fs::create_dir_all(&self.dir).map_err(|err| storage_error(&self.dir, err))?;
        let path = self.path_for(key);
        fs::write(&path, bytes).map_err(|err| storage_error(&path, err))
    }

    fn remove(&mut self, key: &str) -> RestorationResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(&path, err)),
        }
    }
}
