// ============================================================================
// Pulselog Infrastructure - PostgreSQL Membership Repository
// File: crates/pulselog-infrastructure/src/database/postgres/membership_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use pulselog_core::domain::{Membership, TenantRole};
use pulselog_core::error::DomainError;
use pulselog_core::repositories::MembershipRepository;

pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MembershipRow {
    pub id: Uuid,
    pub user_id: String,
    pub tenant_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

// Role is a closed set: a row carrying anything else is a data error, never
// silently defaulted.
impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let role =
            TenantRole::from_str(&row.role).ok_or_else(|| DomainError::UnknownRole(row.role))?;
        Ok(Membership {
            id: row.id,
            user_id: row.user_id,
            tenant_id: row.tenant_id,
            role,
            joined_at: row.joined_at,
        })
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find(
        &self,
        user_id: &str,
        tenant_id: &Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tenant_id, role, joined_at
            FROM memberships
            WHERE user_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding membership: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.map(Membership::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tenant_id, role, joined_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing memberships: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn create(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let row: MembershipRow = sqlx::query_as(
            r#"
            INSERT INTO memberships (id, user_id, tenant_id, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, tenant_id, role, joined_at
            "#,
        )
        .bind(membership.id)
        .bind(&membership.user_id)
        .bind(membership.tenant_id)
        .bind(membership.role.as_str())
        .bind(membership.joined_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating membership: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::MembershipAlreadyExists
            } else {
                DomainError::DatabaseError(msg)
            }
        })?;

        row.try_into()
    }

    async fn update(&self, membership: &Membership) -> Result<Membership, DomainError> {
        let row: MembershipRow = sqlx::query_as(
            r#"
            UPDATE memberships
            SET role = $2
            WHERE id = $1
            RETURNING id, user_id, tenant_id, role, joined_at
            "#,
        )
        .bind(membership.id)
        .bind(membership.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating membership: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn delete(&self, user_id: &str, tenant_id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE user_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error deleting membership: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
