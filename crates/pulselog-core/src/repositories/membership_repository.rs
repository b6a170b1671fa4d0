//! Membership repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Membership;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
    ) -> Result<Option<Membership>, DomainError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Membership>, DomainError>;
    async fn create(&self, membership: &Membership) -> Result<Membership, DomainError>;
    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError>;
    /// Returns true when a record was removed.
    async fn delete(&self, user_id: &str, tenant_id: &Uuid) -> Result<bool, DomainError>;
}
