use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{CacheError, CartCache};

/// In-process cart cache.
#[derive(Debug, Default)]
pub struct MemoryCartCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCartCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a value without going through the async trait.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl CartCache for MemoryCartCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
