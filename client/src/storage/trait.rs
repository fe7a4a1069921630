use async_trait::async_trait;

use crate::error::ClientResult;

/// String key-value store that survives the process, in the manner of
/// browser local storage
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> ClientResult<()>;
}
