//! File-backed key-value store: one JSON file per key in the data directory.

use anyhow::{Context, Result};
use log::debug;
use std::fs;

use crate::backend::storage::file::connection::FileConnection;
use crate::backend::storage::traits::KeyValueStorage;

#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    connection: FileConnection,
}

impl FileKeyValueStore {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }
}

impl KeyValueStorage for FileKeyValueStore {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.connection.key_file_path(key);
        self.connection.write_atomically(&path, value)?;
        debug!("Saved {} bytes under '{}' to {:?}", value.len(), key, path);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.connection.key_file_path(key);
        if !path.exists() {
            debug!("No stored value for '{}' at {:?}", key, path);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!("Loaded {} bytes for '{}' from {:?}", content.len(), key, path);
        Ok(Some(content))
    }
}
