//! Process-wide simple settings
//!
//! Scalar values kept outside the per-account file tree and shared by every
//! network environment.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::storage::files;
use crate::shared::constants::MINIMUM_FEE_KEY;
use crate::shared::error::{StorageError, StorageResult};
use crate::shared::types::Quarks;

pub trait SettingsStore: Send + Sync {
    fn minimum_fee(&self) -> StorageResult<Option<Quarks>>;

    fn set_minimum_fee(&self, fee: Quarks) -> StorageResult<()>;

    /// Remove every value written by the storage layer
    fn clear(&self) -> StorageResult<()>;
}

/// Settings persisted as a JSON object
pub struct FileSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write of the settings file within this process
    lock: Mutex<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Map<String, Value>> {
        match files::read_optional(&self.path)? {
            None => Ok(Map::new()),
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(StorageError::corrupt(&self.path, "settings file is not a JSON object")),
                Err(e) => Err(StorageError::corrupt(&self.path, e.to_string())),
            },
        }
    }

    fn save(&self, map: &Map<String, Value>) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(map)?;
        files::write_atomic(&self.path, &bytes)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut map = self.load()?;
        f(&mut map);
        self.save(&map)
    }
}

impl SettingsStore for FileSettingsStore {
    fn minimum_fee(&self) -> StorageResult<Option<Quarks>> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let map = self.load()?;
        match map.get(MINIMUM_FEE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| StorageError::corrupt(&self.path, format!("{} is not an integer", MINIMUM_FEE_KEY))),
        }
    }

    fn set_minimum_fee(&self, fee: Quarks) -> StorageResult<()> {
        self.update(|map| {
            map.insert(MINIMUM_FEE_KEY.to_string(), Value::from(fee));
        })
    }

    /// An unreadable settings file is removed, since no fee can be recovered from it
    fn clear(&self) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.load() {
            Ok(mut map) => {
                if map.remove(MINIMUM_FEE_KEY).is_some() {
                    self.save(&map)?;
                }
            }
            Err(StorageError::CorruptRecord { reason, .. }) => {
                log::warn!("Removing unreadable settings file {}: {}", self.path.display(), reason);
                files::remove_file_if_exists(&self.path)?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    values: Mutex<HashMap<String, Quarks>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn minimum_fee(&self) -> StorageResult<Option<Quarks>> {
        let values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(values.get(MINIMUM_FEE_KEY).copied())
    }

    fn set_minimum_fee(&self, fee: Quarks) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert(MINIMUM_FEE_KEY.to_string(), fee);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        values.remove(MINIMUM_FEE_KEY);
        Ok(())
    }
}
