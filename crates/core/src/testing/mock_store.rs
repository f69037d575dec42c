//! Mock key-value store for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{KeyValueStore, StoreError};

/// Mock implementation of the `KeyValueStore` trait.
///
/// Behaves like `MemoryStore` but can be told to fail reads or writes, and
/// counts writes so tests can assert on persistence traffic.
#[derive(Debug, Default)]
pub struct MockStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_reads: Arc<RwLock<bool>>,
    fail_writes: Arc<RwLock<bool>>,
    write_count: Arc<RwLock<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent reads fail.
    pub async fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.write().await = fail;
    }

    /// Make all subsequent writes fail.
    pub async fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }

    /// Number of successful writes so far.
    pub async fn write_count(&self) -> usize {
        *self.write_count.read().await
    }

    /// Peek at a stored blob without going through the trait.
    pub async fn stored(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if *self.fail_reads.read().await {
            return Err(StoreError::Database("simulated read failure".to_string()));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if *self.fail_writes.read().await {
            return Err(StoreError::Database("simulated write failure".to_string()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        *self.write_count.write().await += 1;
        Ok(())
    }
}
