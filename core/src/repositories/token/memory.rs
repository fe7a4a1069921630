//! In-memory implementation of RefreshTokenRepository
//!
//! Used by tests across the workspace and by the server when no database is
//! configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::identity::UserId;
use crate::domain::entities::token::RefreshToken;
use crate::errors::{DomainError, TokenError};

use super::r#trait::RefreshTokenRepository;

/// Refresh token records keyed by token value
#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record, revoked ones included
    pub async fn records(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }

    /// Looks up a record regardless of its revocation state
    pub async fn get(&self, value: &str) -> Option<RefreshToken> {
        self.tokens.read().await.get(value).cloned()
    }

    /// Overwrites the expiry of a stored record
    pub async fn set_expires_at(&self, value: &str, expires_at: DateTime<Utc>) -> bool {
        match self.tokens.write().await.get_mut(value) {
            Some(token) => {
                token.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token) {
            return Err(TokenError::DuplicateToken.into());
        }

        tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn find_active_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value).filter(|t| !t.is_revoked).cloned())
    }

    async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut active: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && !t.is_revoked)
            .cloned()
            .collect();
        active.sort_by_key(|t| t.created_at);
        Ok(active)
    }

    async fn mark_revoked(&self, token: &RefreshToken) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&token.token) {
            Some(stored) if stored.id == token.id && !stored.is_revoked => {
                stored.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at >= cutoff);
        Ok(before - tokens.len())
    }
}
