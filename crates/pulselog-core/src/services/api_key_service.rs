// ============================================================================
// Pulselog Core - API Key Service
// File: crates/pulselog-core/src/services/api_key_service.rs
// ============================================================================
//! API key issuance, validation, and revocation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use pulselog_security::keygen;
use pulselog_security::SecretHasher;
use pulselog_shared::utils::mask_credential;

use crate::domain::ApiKey;
use crate::error::{DomainError, RejectionReason};
use crate::repositories::{ApiKeyRepository, TenantRepository};

/// A freshly issued key. `plaintext` is returned to the caller exactly once
/// and is never retrievable again.
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    pub plaintext: String,
    pub record: ApiKey,
}

/// Outcome of validating a presented key. Rejections are values, not
/// errors; `Err` is reserved for infrastructure failures.
#[derive(Debug, Clone)]
pub enum ApiKeyValidation {
    Valid(ApiKey),
    Rejected(RejectionReason),
}

pub struct ApiKeyService<K: ApiKeyRepository, T: TenantRepository> {
    keys: Arc<K>,
    tenants: Arc<T>,
}

impl<K: ApiKeyRepository, T: TenantRepository> ApiKeyService<K, T> {
    pub fn new(keys: Arc<K>, tenants: Arc<T>) -> Self {
        Self { keys, tenants }
    }

    /// Issue a new key for an active tenant. The secret body is stored only
    /// as a salted one-way hash; the clear prefix is kept for indexed
    /// lookup.
    pub async fn issue(
        &self,
        tenant_id: Uuid,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<IssuedApiKey, DomainError> {
        let tenant = self
            .tenants
            .find_by_id(&tenant_id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;
        if !tenant.is_active {
            return Err(DomainError::TenantNotActive);
        }

        let material = keygen::generate_api_key();
        let secret_hash = SecretHasher::hash(&material.secret)
            .map_err(|e| DomainError::SecretHashError(e.to_string()))?;

        let key = ApiKey::new(tenant_id, name, material.prefix, secret_hash, expires_at)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        let record = self.keys.create(&key).await?;

        info!(
            "API key issued: {} ({}) for tenant {}",
            record.name, record.key_prefix, record.tenant_id
        );
        Ok(IssuedApiKey {
            plaintext: material.plaintext,
            record,
        })
    }

    /// Validate a presented key. The rejection never distinguishes "unknown
    /// prefix" from "wrong secret", and a deactivated tenant overrides an
    /// otherwise healthy key.
    pub async fn validate(&self, presented: &str) -> Result<ApiKeyValidation, DomainError> {
        let now = Utc::now();

        let Some((prefix, secret)) = keygen::parse_api_key(presented) else {
            return Ok(ApiKeyValidation::Rejected(RejectionReason::Malformed));
        };

        let Some(key) = self.keys.find_by_prefix(prefix).await? else {
            warn!(
                "API key validation failed for {}: unknown credential",
                mask_credential(presented)
            );
            return Ok(ApiKeyValidation::Rejected(RejectionReason::NotFound));
        };

        if !SecretHasher::verify(secret, &key.secret_hash) {
            warn!(
                "API key validation failed for {}: unknown credential",
                mask_credential(presented)
            );
            return Ok(ApiKeyValidation::Rejected(RejectionReason::NotFound));
        }

        if key.revoked_at.is_some() || !key.is_active {
            return Ok(ApiKeyValidation::Rejected(RejectionReason::Revoked));
        }
        if key.is_expired(now) {
            return Ok(ApiKeyValidation::Rejected(RejectionReason::Expired));
        }

        match self.tenants.find_by_id(&key.tenant_id).await? {
            Some(tenant) if tenant.is_active => {}
            _ => {
                return Ok(ApiKeyValidation::Rejected(RejectionReason::TenantInactive));
            }
        }

        // Best-effort usage stamp: a persistence failure here must not fail
        // the authentication outcome.
        let mut key = key;
        if let Err(e) = self.keys.record_usage(&key.id, now).await {
            warn!("Failed to record usage for API key {}: {}", key.id, e);
        } else {
            key.record_usage(now);
        }

        Ok(ApiKeyValidation::Valid(key))
    }

    /// Idempotent revoke: a second call on an already revoked key is a
    /// no-op.
    pub async fn revoke(&self, key_id: &Uuid) -> Result<(), DomainError> {
        let key = self
            .keys
            .find_by_id(key_id)
            .await?
            .ok_or(DomainError::ApiKeyNotFound)?;

        if key.revoked_at.is_some() {
            return Ok(());
        }

        self.keys.revoke(key_id, Utc::now()).await?;
        info!("API key revoked: {} ({})", key.name, key.id);
        Ok(())
    }

    pub async fn list_for_tenant(&self, tenant_id: &Uuid) -> Result<Vec<ApiKey>, DomainError> {
        self.keys.find_by_tenant(tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::api_key_repository::MockApiKeyRepository;
    use crate::repositories::tenant_repository::MockTenantRepository;

    fn service(
        keys: MockApiKeyRepository,
        tenants: MockTenantRepository,
    ) -> ApiKeyService<MockApiKeyRepository, MockTenantRepository> {
        ApiKeyService::new(Arc::new(keys), Arc::new(tenants))
    }

    #[tokio::test]
    async fn malformed_key_short_circuits_before_lookup() {
        // No expectations: any repository call would panic.
        let service = service(MockApiKeyRepository::new(), MockTenantRepository::new());

        let outcome = service.validate("not-an-api-key").await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::Malformed)
        ));
    }

    #[tokio::test]
    async fn unknown_prefix_is_not_found() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_prefix().returning(|_| Ok(None));
        let service = service(keys, MockTenantRepository::new());

        let presented = format!("plk_{}{}", "ab12cd34", "0".repeat(64));
        let outcome = service.validate(&presented).await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::NotFound)
        ));
    }

    #[tokio::test]
    async fn issue_refuses_unknown_tenant() {
        let mut tenants = MockTenantRepository::new();
        tenants.expect_find_by_id().returning(|_| Ok(None));
        let service = service(MockApiKeyRepository::new(), tenants);

        let err = service.issue(Uuid::new_v4(), "ci-bot", None).await;
        assert!(matches!(err, Err(DomainError::TenantNotFound)));
    }
}
