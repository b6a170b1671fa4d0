//! In-memory tenant repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use pulselog_core::domain::Tenant;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::TenantRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryTenantRepository {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().map_err(|_| poisoned())?;
        Ok(tenants.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().map_err(|_| poisoned())?;
        Ok(tenants
            .values()
            .find(|t| t.slug.eq_ignore_ascii_case(slug))
            .cloned())
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().map_err(|_| poisoned())?;
        if tenants
            .values()
            .any(|t| t.slug.eq_ignore_ascii_case(&tenant.slug))
        {
            return Err(DomainError::TenantSlugAlreadyExists(tenant.slug.clone()));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().map_err(|_| poisoned())?;
        if !tenants.contains_key(&tenant.id) {
            return Err(DomainError::TenantNotFound);
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }
}
