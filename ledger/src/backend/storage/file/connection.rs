use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::storage::file::key_value_repository::FileKeyValueStore;
use crate::backend::storage::traits::Connection;

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "TRAVEL_LEDGER_DATA_DIR";

const CONFIG_FILE_NAME: &str = "ledger_config.yaml";

/// FileConnection manages the data directory and the files inside it
#[derive(Clone, Debug)]
pub struct FileConnection {
    base_directory: PathBuf,
}

impl FileConnection {
    /// Create a new file connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default data directory: the
    /// `TRAVEL_LEDGER_DATA_DIR` environment variable if set, otherwise
    /// `~/Documents/Travel Ledger`
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory()?)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                debug!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return Ok(PathBuf::from(dir));
            }
        }

        let documents_dir = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(documents_dir.join("Travel Ledger"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the file holding the value for `key`
    pub fn key_file_path(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", Self::safe_file_stem(key)))
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.base_directory.join(CONFIG_FILE_NAME)
    }

    /// Write a file atomically: write to a temp file next to it, then rename
    pub fn write_atomically(&self, path: &Path, content: &str) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(())
    }

    /// Turn an arbitrary key into a file stem made of ASCII letters, digits
    /// and underscores
    pub fn safe_file_stem(key: &str) -> String {
        let mapped: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        let mut collapsed = String::with_capacity(mapped.len());
        for c in mapped.chars() {
            if c == '_' && collapsed.ends_with('_') {
                continue;
            }
            collapsed.push(c);
        }

        let trimmed = collapsed.trim_matches('_');
        if trimmed.is_empty() {
            "ledger".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl Connection for FileConnection {
    type KeyValueStore = FileKeyValueStore;

    fn create_key_value_store(&self) -> Self::KeyValueStore {
        FileKeyValueStore::new(self.clone())
    }
}
