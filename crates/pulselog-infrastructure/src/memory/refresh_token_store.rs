//! In-memory refresh token repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pulselog_core::domain::RefreshToken;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::RefreshTokenRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<Uuid, RefreshToken>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().map_err(|_| poisoned())?;
        Ok(tokens.get(id).cloned())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().map_err(|_| poisoned())?;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn create(&self, token: &RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        tokens.insert(token.id, token.clone());
        Ok(token.clone())
    }

    async fn mark_rotated(
        &self,
        id: &Uuid,
        replaced_by_token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError> {
        // Check-and-consume under one write guard: the in-memory equivalent
        // of the database's conditional UPDATE.
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        match tokens.get_mut(id) {
            Some(token) if token.revoked_at.is_none() => {
                token.mark_replaced(replaced_by_token_hash, at, by_ip);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke<'a>(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
        by_ip: Option<&'a str>,
    ) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().map_err(|_| poisoned())?;
        if let Some(token) = tokens.get_mut(id) {
            token.revoke(at, by_ip);
        }
        Ok(())
    }
}
