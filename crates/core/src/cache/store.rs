//! Key-value persistence abstraction for the rating cache.
//!
//! The cache serializes its whole map as one JSON blob under a well-known
//! key; the store only has to get and set opaque strings. Implementations:
//! `SqliteStore` for durable persistence, `MemoryStore` for tests and for
//! running without a writable disk.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur in the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store database error: {0}")]
    Database(String),

    #[error("Store serialization error: {0}")]
    Serialize(String),
}

/// Trait for blob persistence backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the blob stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous blob.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
