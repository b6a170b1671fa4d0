//! Tenant membership and role resolution

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::{Membership, TenantRole};
use crate::error::DomainError;
use crate::repositories::MembershipRepository;

/// Membership lifecycle plus the role resolver used by authorization
/// policies.
pub struct MembershipService<M: MembershipRepository> {
    memberships: Arc<M>,
}

impl<M: MembershipRepository> MembershipService<M> {
    pub fn new(memberships: Arc<M>) -> Self {
        Self { memberships }
    }

    /// Grant a membership. At most one record may exist per (user, tenant)
    /// pair.
    pub async fn grant(
        &self,
        user_id: &str,
        tenant_id: Uuid,
        role: TenantRole,
    ) -> Result<Membership, DomainError> {
        if self.memberships.find(user_id, &tenant_id).await?.is_some() {
            return Err(DomainError::MembershipAlreadyExists);
        }

        let membership = Membership::new(user_id, tenant_id, role)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        let created = self.memberships.create(&membership).await?;

        info!(
            "Membership granted: user {} in tenant {} as {}",
            created.user_id,
            created.tenant_id,
            created.role.as_str()
        );
        Ok(created)
    }

    pub async fn change_role(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
        role: TenantRole,
    ) -> Result<Membership, DomainError> {
        let mut membership = self
            .memberships
            .find(user_id, tenant_id)
            .await?
            .ok_or(DomainError::MembershipNotFound)?;

        membership.change_role(role);
        self.memberships.update(&membership).await
    }

    pub async fn revoke_membership(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
    ) -> Result<(), DomainError> {
        if !self.memberships.delete(user_id, tenant_id).await? {
            return Err(DomainError::MembershipNotFound);
        }
        info!("Membership revoked: user {} in tenant {}", user_id, tenant_id);
        Ok(())
    }

    /// Resolve the role a user holds in a tenant. `None` means no
    /// membership.
    pub async fn resolve_role(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
    ) -> Result<Option<TenantRole>, DomainError> {
        Ok(self
            .memberships
            .find(user_id, tenant_id)
            .await?
            .map(|m| m.role))
    }

    /// "At least" check over the closed role ordering; false for a missing
    /// membership.
    pub async fn has_role(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
        minimum: TenantRole,
    ) -> Result<bool, DomainError> {
        Ok(self
            .resolve_role(user_id, tenant_id)
            .await?
            .map(|role| role.at_least(minimum))
            .unwrap_or(false))
    }

    pub async fn memberships_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Membership>, DomainError> {
        self.memberships.find_by_user(user_id).await
    }
}
