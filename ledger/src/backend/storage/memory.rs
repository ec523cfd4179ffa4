//! In-memory key-value store.
//!
//! Clones share the same underlying map, so a test can hand one clone to the
//! ledger and inspect or sabotage storage through another.

use anyhow::{anyhow, Result};
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{Connection, KeyValueStorage};

#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStorage for InMemoryKeyValueStore {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(anyhow!("in-memory store is refusing writes"));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        debug!("Saved {} bytes under '{}' (memory)", value.len(), key);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }
}

impl Connection for InMemoryKeyValueStore {
    type KeyValueStore = InMemoryKeyValueStore;

    fn create_key_value_store(&self) -> Self::KeyValueStore {
        self.clone()
    }
}
