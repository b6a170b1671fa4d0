// ============================================================================
// Pulselog Infrastructure - PostgreSQL Tenant Repository
// File: crates/pulselog-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use pulselog_core::domain::Tenant;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::TenantRepository;

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            slug: row.slug,
            is_active: row.is_active,
            created_at: row.created_at,
            deactivated_at: row.deactivated_at,
        }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, is_active, created_at, deactivated_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding tenant by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, is_active, created_at, deactivated_at
            FROM tenants
            WHERE LOWER(slug) = LOWER($1)
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding tenant by slug: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        info!("Creating tenant: {}", tenant.slug);

        let row: TenantRow = sqlx::query_as(
            r#"
            INSERT INTO tenants (id, name, slug, is_active, created_at, deactivated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, slug, is_active, created_at, deactivated_at
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.deactivated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating tenant: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::TenantSlugAlreadyExists(tenant.slug.clone())
            } else {
                DomainError::DatabaseError(msg)
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let row: TenantRow = sqlx::query_as(
            r#"
            UPDATE tenants
            SET name = $2, slug = $3, is_active = $4, deactivated_at = $5
            WHERE id = $1
            RETURNING id, name, slug, is_active, created_at, deactivated_at
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.is_active)
        .bind(tenant.deactivated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating tenant: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }
}
