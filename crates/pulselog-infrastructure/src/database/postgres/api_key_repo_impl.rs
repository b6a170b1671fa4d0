// ============================================================================
// Pulselog Infrastructure - PostgreSQL API Key Repository
// File: crates/pulselog-infrastructure/src/database/postgres/api_key_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, warn};
use uuid::Uuid;

use pulselog_core::domain::ApiKey;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::ApiKeyRepository;

pub struct PgApiKeyRepository {
    pool: PgPool,
}

impl PgApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ApiKeyRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub secret_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            key_prefix: row.key_prefix,
            secret_hash: row.secret_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_used_at: row.last_used_at,
            revoked_at: row.revoked_at,
        }
    }
}

const API_KEY_COLUMNS: &str = "id, tenant_id, name, key_prefix, secret_hash, is_active, \
     created_at, expires_at, last_used_at, revoked_at";

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ApiKey>, DomainError> {
        let row: Option<ApiKeyRow> = sqlx::query_as(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding API key by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError> {
        // key_prefix carries a unique index; this is the hot validation path.
        let row: Option<ApiKeyRow> = sqlx::query_as(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key_prefix = $1"
        ))
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding API key by prefix: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Vec<ApiKey>, DomainError> {
        let rows: Vec<ApiKeyRow> = sqlx::query_as(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE tenant_id = $1 ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing API keys: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, key: &ApiKey) -> Result<ApiKey, DomainError> {
        let row: ApiKeyRow = sqlx::query_as(&format!(
            "INSERT INTO api_keys ({API_KEY_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {API_KEY_COLUMNS}"
        ))
        .bind(key.id)
        .bind(key.tenant_id)
        .bind(&key.name)
        .bind(&key.key_prefix)
        .bind(&key.secret_hash)
        .bind(key.is_active)
        .bind(key.created_at)
        .bind(key.expires_at)
        .bind(key.last_used_at)
        .bind(key.revoked_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating API key: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn revoke(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        // Conditional update keeps the transition idempotent: the timestamp
        // is written at most once.
        sqlx::query(
            r#"
            UPDATE api_keys
            SET is_active = FALSE, revoked_at = $2
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error revoking API key: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    async fn record_usage(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE api_keys
            SET last_used_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            warn!("Database error recording API key usage: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
