//! Token cache shared by the pipeline and the auth client
//!
//! Reads prefer the in-memory cell and fall back to storage, caching what
//! they find. Writes go to both. Storage failures are logged and otherwise
//! ignored; the in-memory cell stays authoritative for the process.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::storage::TokenStorage;

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "fc_access_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "fc_refresh_token";

#[derive(Debug, Default)]
struct Cell {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

pub struct TokenCache {
    cell: RwLock<Cell>,
    storage: Arc<dyn TokenStorage>,
}

impl TokenCache {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            cell: RwLock::new(Cell::default()),
            storage,
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        if let Some(token) = self.cell.read().await.access_token.clone() {
            return Some(token);
        }

        let token = self.load(ACCESS_TOKEN_KEY).await?;
        self.cell.write().await.access_token = Some(token.clone());
        Some(token)
    }

    pub async fn refresh_token(&self) -> Option<String> {
        if let Some(token) = self.cell.read().await.refresh_token.clone() {
            return Some(token);
        }

        let token = self.load(REFRESH_TOKEN_KEY).await?;
        self.cell.write().await.refresh_token = Some(token.clone());
        Some(token)
    }

    /// Stores a new access token, and the refresh token when one is given
    pub async fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        {
            let mut cell = self.cell.write().await;
            cell.access_token = Some(access_token.to_string());
            if let Some(refresh) = refresh_token {
                cell.refresh_token = Some(refresh.to_string());
            }
        }

        self.store(ACCESS_TOKEN_KEY, access_token).await;
        if let Some(refresh) = refresh_token {
            self.store(REFRESH_TOKEN_KEY, refresh).await;
        }
    }

    pub async fn clear(&self) {
        *self.cell.write().await = Cell::default();

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!(key, "Failed to remove token from storage: {}", e);
            }
        }
    }

    async fn load(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!(key, "Failed to read token from storage: {}", e);
                None
            }
        }
    }

    async fn store(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value).await {
            warn!(key, "Failed to write token to storage: {}", e);
        }
    }
}
