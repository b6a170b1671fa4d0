// ============================================================================
// Pulselog Core - Authentication Gate
// File: crates/pulselog-core/src/services/auth_service.rs
// ============================================================================
//! Request-time credential orchestration

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use pulselog_security::keygen;
use pulselog_shared::utils::mask_credential;

use crate::domain::TenantRole;
use crate::error::{DomainError, RejectionReason};
use crate::repositories::{
    ApiKeyRepository, MembershipRepository, RefreshTokenRepository, TenantRepository,
};
use crate::services::api_key_service::{ApiKeyService, ApiKeyValidation};
use crate::services::membership_service::MembershipService;
use crate::services::refresh_token_service::{RefreshTokenService, RefreshTokenValidation};

/// Identity claim set handed to the transport layer on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub role: Option<TenantRole>,
    pub is_api_key: bool,
}

/// Terminal result of one authentication attempt. Rejections are values;
/// `Err` is reserved for infrastructure failures, so callers can tell
/// "log in again" from "service unavailable".
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(AuthenticatedIdentity),
    Rejected(RejectionReason),
}

/// The request-time orchestrator. Routes a presented credential to the API
/// key validator or the refresh token validator based on its shape, then
/// attaches tenant and role claims. Terminal in one request cycle: no
/// internal retries.
pub struct AuthGate<K, R, M, T>
where
    K: ApiKeyRepository,
    R: RefreshTokenRepository,
    M: MembershipRepository,
    T: TenantRepository,
{
    api_keys: ApiKeyService<K, T>,
    refresh_tokens: RefreshTokenService<R>,
    memberships: MembershipService<M>,
    tenants: Arc<T>,
}

impl<K, R, M, T> AuthGate<K, R, M, T>
where
    K: ApiKeyRepository,
    R: RefreshTokenRepository,
    M: MembershipRepository,
    T: TenantRepository,
{
    pub fn new(
        api_keys: ApiKeyService<K, T>,
        refresh_tokens: RefreshTokenService<R>,
        memberships: MembershipService<M>,
        tenants: Arc<T>,
    ) -> Self {
        Self {
            api_keys,
            refresh_tokens,
            memberships,
            tenants,
        }
    }

    /// Authenticate a presented credential against an intended tenant
    /// context. `credential` of `None` (or empty) is the "try other scheme"
    /// signal `NotPresented`, not an error.
    pub async fn authenticate(
        &self,
        credential: Option<&str>,
        tenant_id: Option<&Uuid>,
    ) -> Result<AuthOutcome, DomainError> {
        let Some(credential) = credential.filter(|c| !c.is_empty()) else {
            return Ok(AuthOutcome::Rejected(RejectionReason::NotPresented));
        };

        if keygen::looks_like_api_key(credential) {
            self.authenticate_api_key(credential).await
        } else {
            self.authenticate_refresh_token(credential, tenant_id).await
        }
    }

    async fn authenticate_api_key(
        &self,
        credential: &str,
    ) -> Result<AuthOutcome, DomainError> {
        match self.api_keys.validate(credential).await? {
            ApiKeyValidation::Valid(key) => {
                Ok(AuthOutcome::Authenticated(AuthenticatedIdentity {
                    tenant_id: Some(key.tenant_id),
                    user_id: None,
                    role: None,
                    is_api_key: true,
                }))
            }
            ApiKeyValidation::Rejected(reason) => {
                warn!(
                    "Authentication rejected ({}) for {}",
                    reason.as_str(),
                    mask_credential(credential)
                );
                Ok(AuthOutcome::Rejected(reason))
            }
        }
    }

    async fn authenticate_refresh_token(
        &self,
        credential: &str,
        tenant_id: Option<&Uuid>,
    ) -> Result<AuthOutcome, DomainError> {
        let token = match self.refresh_tokens.validate(credential).await? {
            RefreshTokenValidation::Valid(token) => token,
            RefreshTokenValidation::Rejected(reason) => {
                warn!(
                    "Authentication rejected ({}) for {}",
                    reason.as_str(),
                    mask_credential(credential)
                );
                return Ok(AuthOutcome::Rejected(reason));
            }
        };

        let Some(tenant_id) = tenant_id else {
            // No tenant context requested: the identity carries only the
            // verified user.
            return Ok(AuthOutcome::Authenticated(AuthenticatedIdentity {
                tenant_id: None,
                user_id: Some(token.user_id),
                role: None,
                is_api_key: false,
            }));
        };

        match self.tenants.find_by_id(tenant_id).await? {
            Some(tenant) if tenant.is_active => {}
            _ => {
                return Ok(AuthOutcome::Rejected(RejectionReason::TenantInactive));
            }
        }

        let Some(role) = self
            .memberships
            .resolve_role(&token.user_id, tenant_id)
            .await?
        else {
            return Ok(AuthOutcome::Rejected(RejectionReason::NoMembership));
        };

        Ok(AuthOutcome::Authenticated(AuthenticatedIdentity {
            tenant_id: Some(*tenant_id),
            user_id: Some(token.user_id),
            role: Some(role),
            is_api_key: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::api_key_repository::MockApiKeyRepository;
    use crate::repositories::membership_repository::MockMembershipRepository;
    use crate::repositories::refresh_token_repository::MockRefreshTokenRepository;
    use crate::repositories::tenant_repository::MockTenantRepository;

    type MockGate = AuthGate<
        MockApiKeyRepository,
        MockRefreshTokenRepository,
        MockMembershipRepository,
        MockTenantRepository,
    >;

    fn gate(
        keys: MockApiKeyRepository,
        tokens: MockRefreshTokenRepository,
        memberships: MockMembershipRepository,
        tenants: MockTenantRepository,
    ) -> MockGate {
        let tenants = Arc::new(tenants);
        AuthGate::new(
            ApiKeyService::new(Arc::new(keys), tenants.clone()),
            RefreshTokenService::new(Arc::new(tokens), 1),
            MembershipService::new(Arc::new(memberships)),
            tenants,
        )
    }

    #[tokio::test]
    async fn missing_credential_is_not_presented() {
        let gate = gate(
            MockApiKeyRepository::new(),
            MockRefreshTokenRepository::new(),
            MockMembershipRepository::new(),
            MockTenantRepository::new(),
        );

        for credential in [None, Some("")] {
            let outcome = gate.authenticate(credential, None).await.unwrap();
            assert!(matches!(
                outcome,
                AuthOutcome::Rejected(RejectionReason::NotPresented)
            ));
        }
    }

    #[tokio::test]
    async fn garbage_session_credential_is_malformed() {
        let gate = gate(
            MockApiKeyRepository::new(),
            MockRefreshTokenRepository::new(),
            MockMembershipRepository::new(),
            MockTenantRepository::new(),
        );

        let outcome = gate.authenticate(Some("???"), None).await.unwrap();
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected(RejectionReason::Malformed)
        ));
    }

    #[tokio::test]
    async fn api_key_shaped_credential_routes_to_key_path() {
        let mut keys = MockApiKeyRepository::new();
        keys.expect_find_by_prefix().returning(|_| Ok(None));
        let gate = gate(
            keys,
            MockRefreshTokenRepository::new(),
            MockMembershipRepository::new(),
            MockTenantRepository::new(),
        );

        let presented = format!("plk_{}{}", "ab12cd34", "0".repeat(64));
        let outcome = gate.authenticate(Some(&presented), None).await.unwrap();
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected(RejectionReason::NotFound)
        ));
    }
}
