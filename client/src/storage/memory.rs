use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::trait_::TokenStorage;
use crate::error::ClientResult;

/// Process-local storage, used when no token file is configured
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
