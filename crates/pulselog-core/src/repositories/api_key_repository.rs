//! API key repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ApiKey;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ApiKey>, DomainError>;
    /// Indexed lookup by the clear prefix. Never a full scan.
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError>;
    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<ApiKey>, DomainError>;
    async fn create(&self, key: &ApiKey) -> Result<ApiKey, DomainError>;
    /// Idempotent: a no-op for a key that is already revoked.
    async fn revoke(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    /// Best-effort usage stamp; callers tolerate failure.
    async fn record_usage(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
}
