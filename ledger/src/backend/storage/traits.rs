//! # Storage Traits
//!
//! Storage abstractions the domain layer depends on, so the ledger can be
//! persisted to files, kept in memory for tests, or moved to another backend
//! without touching domain code.

use anyhow::Result;

/// A string key-value service.
///
/// The ledger stores its entire serialized state under a single key and
/// rewrites it in full on every save.
pub trait KeyValueStorage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Load the value stored under `key`; `None` if the key is absent
    fn load(&self, key: &str) -> Result<Option<String>>;
}

/// Trait defining the interface for storage connections
///
/// Abstracts away the specific connection type (files, memory, ...) and acts
/// as a factory for the key-value store the ledger persists through.
pub trait Connection: Send + Sync + Clone {
    /// The type of KeyValueStorage this connection creates
    type KeyValueStore: KeyValueStorage + 'static;

    /// Create a key-value store backed by this connection
    fn create_key_value_store(&self) -> Self::KeyValueStore;
}
