//! In-memory API key repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pulselog_core::domain::ApiKey;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::ApiKeyRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    keys: RwLock<HashMap<Uuid, ApiKey>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().map_err(|_| poisoned())?;
        Ok(keys.get(id).cloned())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError> {
        let keys = self.keys.read().map_err(|_| poisoned())?;
        Ok(keys.values().find(|k| k.key_prefix == prefix).cloned())
    }

    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<ApiKey>, DomainError> {
        let keys = self.keys.read().map_err(|_| poisoned())?;
        let mut found: Vec<ApiKey> = keys
            .values()
            .filter(|k| k.tenant_id == *tenant_id)
            .cloned()
            .collect();
        found.sort_by_key(|k| k.created_at);
        Ok(found)
    }

    async fn create(&self, key: &ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        keys.insert(key.id, key.clone());
        Ok(key.clone())
    }

    async fn revoke(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        if let Some(key) = keys.get_mut(id) {
            key.revoke(at);
        }
        Ok(())
    }

    async fn record_usage(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        if let Some(key) = keys.get_mut(id) {
            key.record_usage(at);
        }
        Ok(())
    }
}
