//! Tenant administrative lifecycle

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::Tenant;
use crate::error::DomainError;
use crate::repositories::TenantRepository;

/// Administrative operations on tenants. Soft lifecycle only: tenants are
/// deactivated and reactivated, never deleted.
pub struct TenantService<T: TenantRepository> {
    tenants: Arc<T>,
}

impl<T: TenantRepository> TenantService<T> {
    pub fn new(tenants: Arc<T>) -> Self {
        Self { tenants }
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<Tenant, DomainError> {
        let slug = slug.trim().to_lowercase();
        if self.tenants.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::TenantSlugAlreadyExists(slug));
        }

        let tenant = Tenant::new(name, &slug)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        let created = self.tenants.create(&tenant).await?;

        info!("Tenant created: {} ({})", created.slug, created.id);
        Ok(created)
    }

    /// Deactivation invalidates every credential the tenant owns at
    /// validation time, without touching the individual credential records.
    pub async fn deactivate(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        let mut tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        tenant.deactivate(Utc::now());
        let updated = self.tenants.update(&tenant).await?;

        info!("Tenant deactivated: {}", updated.id);
        Ok(updated)
    }

    pub async fn reactivate(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        let mut tenant = self
            .tenants
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFound)?;

        tenant.reactivate();
        let updated = self.tenants.update(&tenant).await?;

        info!("Tenant reactivated: {}", updated.id);
        Ok(updated)
    }
}
