//! In-memory membership repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use pulselog_core::domain::Membership;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::MembershipRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryMembershipRepository {
    // Keyed by (user, tenant): at most one membership per pair.
    memberships: RwLock<HashMap<(String, Uuid), Membership>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn find(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        let memberships = self.memberships.read().map_err(|_| poisoned())?;
        Ok(memberships
            .get(&(user_id.to_string(), *tenant_id))
            .cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Membership>, DomainError> {
        let memberships = self.memberships.read().map_err(|_| poisoned())?;
        let mut found: Vec<Membership> = memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.joined_at);
        Ok(found)
    }

    async fn create(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let mut memberships = self.memberships.write().map_err(|_| poisoned())?;
        let key = (membership.user_id.clone(), membership.tenant_id);
        if memberships.contains_key(&key) {
            return Err(DomainError::MembershipAlreadyExists);
        }
        memberships.insert(key, membership.clone());
        Ok(membership.clone())
    }

    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let mut memberships = self.memberships.write().map_err(|_| poisoned())?;
        let key = (membership.user_id.clone(), membership.tenant_id);
        if !memberships.contains_key(&key) {
            return Err(DomainError::MembershipNotFound);
        }
        memberships.insert(key, membership.clone());
        Ok(membership.clone())
    }

    async fn delete(&self, user_id: &str, tenant_id: &Uuid) -> Result<bool, DomainError> {
        let mut memberships = self.memberships.write().map_err(|_| poisoned())?;
        Ok(memberships
            .remove(&(user_id.to_string(), *tenant_id))
            .is_some())
    }
}
