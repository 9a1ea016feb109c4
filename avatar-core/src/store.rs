//! Persistence of the profile record.
//!
//! The record lives under one fixed key in a [`KeyValueStore`], the stand-in
//! for browser local storage. [`TransformStore`] reads it leniently (missing
//! or corrupt records load as defaults) and writes it back whole, so fields
//! owned by the rest of the application survive every commit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::equipment::Equipment;
use crate::limb::{Limb, LimbMap, LimbTransform};
use crate::schema::ProfileRecord;

/// Key the profile record is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "godly_kids_data_v2";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// String key-value storage.
pub trait KeyValueStore {
    /// The value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one value.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.into());
        Self { values }
    }

    /// Borrow a value without going through the trait.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage with one JSON file per key in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_filename(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Sanitize a key for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Reads and writes limb overrides and equipment inside the profile record.
#[derive(Debug, Clone)]
pub struct TransformStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> TransformStore<S> {
    /// Wrap `backend`, keeping the record under `key`.
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Unwrap the backend.
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Load the record. Missing, unreadable or corrupt records load as the
    /// default record; failures are logged, never returned.
    #[must_use]
    pub fn load_record(&self) -> ProfileRecord {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProfileRecord::default(),
            Err(e) => {
                tracing::warn!("Failed to read record {}: {e}", self.key);
                return ProfileRecord::default();
            }
        };
        ProfileRecord::from_json(&raw).unwrap_or_else(|e| {
            tracing::warn!("Corrupt record {}, using defaults: {e}", self.key);
            ProfileRecord::default()
        })
    }

    /// Stored limb overrides.
    #[must_use]
    pub fn load_overrides(&self) -> LimbMap<Option<LimbTransform>> {
        self.load_record().limb_overrides()
    }

    /// Stored equipment.
    #[must_use]
    pub fn load_equipment(&self) -> Equipment {
        self.load_record().equipment
    }

    /// Write the override for `limb` in a single store write.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn save_override(&mut self, limb: Limb, transform: &LimbTransform) -> Result<(), StoreError> {
        let mut record = self.load_record();
        record.set_limb_override(limb, transform)?;
        self.write_record(&record)
    }

    /// Replace the equipped parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn save_equipment(&mut self, equipment: &Equipment) -> Result<(), StoreError> {
        let mut record = self.load_record();
        record.equipment = equipment.clone();
        self.write_record(&record)
    }

    /// Remove every limb override, keeping the rest of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn clear_overrides(&mut self) -> Result<(), StoreError> {
        let mut record = self.load_record();
        record.clear_limb_overrides();
        self.write_record(&record)
    }

    fn write_record(&mut self, record: &ProfileRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        self.backend.set(&self.key, &json)
    }
}
