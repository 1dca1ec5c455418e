use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use crate::history::{ KeyValueStore, StoreError };

/// Process-lifetime storage. Everything is gone once the session ends.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
