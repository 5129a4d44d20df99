//! This module provides durable key/value storages, where the session token is kept

use std::path::PathBuf;
use std::path::Path;
use std::error::Error;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::traits::KeyValueStore;
use crate::utils::lock;


/// A storage that only lives as long as this process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.data).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.data).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.data).remove(key);
    }
}


/// A storage that keeps its values in a local JSON file
#[derive(Debug)]
pub struct FileStorage {
    backing_file: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Initialize a storage from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data: Mutex::new(data),
        })
    }

    /// Initialize an empty storage. Nothing is written until the first change
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: Mutex::new(HashMap::new()),
        }
    }

    /// Use the backing file if it is valid, or start from an empty storage otherwise
    pub fn open_or_new(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(storage) => storage,
            Err(err) => {
                log::debug!("Invalid storage file: {}. Using an empty storage", err);
                Self::new(path)
            },
        }
    }

    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    /// Store the current content to the backing file
    fn save_to_file(&self, data: &HashMap<String, String>) {
        let path = &self.backing_file;
        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            },
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, data) {
            log::warn!("Unable to serialize: {}", err);
        };
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.data).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut data = lock(&self.data);
        data.insert(key.to_string(), value.to_string());
        self.save_to_file(&data);
    }

    fn remove(&self, key: &str) {
        let mut data = lock(&self.data);
        if data.remove(key).is_some() {
            self.save_to_file(&data);
        }
    }
}
