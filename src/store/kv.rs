//! Durable string key-value stores backing the playlist persistence.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PlayerError;

/// Minimal synchronous key-value store with string keys and string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlayerError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PlayerError>;
    fn remove(&mut self, key: &str) -> Result<(), PlayerError>;
}

/// One JSON document per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PlayerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlayerError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlayerError> {
        // Slots are replaced atomically through a temp file.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PlayerError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Volatile store, used when the data directory cannot be opened and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    /// When set, every operation fails with `StorageFailure`.
    pub fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<(), PlayerError> {
        if self.fail {
            Err(PlayerError::StorageFailure("store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlayerError> {
        self.check()?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlayerError> {
        self.check()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PlayerError> {
        self.check()?;
        self.values.remove(key);
        Ok(())
    }
}

/// Either backend, chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for AnyStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlayerError> {
        match self {
            Self::File(s) => s.get(key),
            Self::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlayerError> {
        match self {
            Self::File(s) => s.set(key, value),
            Self::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), PlayerError> {
        match self {
            Self::File(s) => s.remove(key),
            Self::Memory(s) => s.remove(key),
        }
    }
}
