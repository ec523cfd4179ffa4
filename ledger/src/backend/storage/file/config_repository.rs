//! # Ledger Config Repository
//!
//! Stores [`LedgerConfig`] as `ledger_config.yaml` at the root of the data
//! directory, next to the ledger itself.
//!
//! ```text
//! Travel Ledger/
//! ├── ledger_config.yaml    ← This module manages this file
//! └── budgetData.json
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! storage_key: budgetData
//! export_file_prefix: 홋카이도_여행_가계부
//! conversion_rates:
//!   JPY: 8.5
//! ```
//!
//! Missing fields fall back to their defaults, so a hand-edited file only
//! needs the values it changes.

use anyhow::{Context, Result};
use log::{debug, info};
use shared::LedgerConfig;
use std::fs;
use std::path::PathBuf;

use super::connection::FileConnection;

#[derive(Clone)]
pub struct LedgerConfigRepository {
    connection: FileConnection,
}

impl LedgerConfigRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }

    pub fn config_path(&self) -> PathBuf {
        self.connection.config_file_path()
    }

    /// Load the config file, writing the defaults first if it doesn't exist
    pub fn load_or_create(&self) -> Result<LedgerConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: LedgerConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Invalid ledger config in {}", config_path.display()))?;
            debug!("Loaded ledger config from {:?}", config_path);
            Ok(config)
        } else {
            let config = LedgerConfig::default();
            self.save(&config)?;
            info!("Created default ledger config at {:?}", config_path);
            Ok(config)
        }
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<()> {
        let config_path = self.config_path();
        let yaml_content = serde_yaml::to_string(config)?;
        self.connection.write_atomically(&config_path, &yaml_content)?;
        debug!("Saved ledger config to {:?}", config_path);
        Ok(())
    }
}
