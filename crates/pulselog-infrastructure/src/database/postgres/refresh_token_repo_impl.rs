// ============================================================================
// Pulselog Infrastructure - PostgreSQL Refresh Token Repository
// File: crates/pulselog-infrastructure/src/database/postgres/refresh_token_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use pulselog_core::domain::RefreshToken;
use pulselog_core::error::DomainError;
use pulselog_core::repositories::RefreshTokenRepository;

pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    pub id: Uuid,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by_ip: String,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,
    pub replaced_by_token_hash: Option<String>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
            created_by_ip: row.created_by_ip,
            revoked_at: row.revoked_at,
            revoked_by_ip: row.revoked_by_ip,
            replaced_by_token_hash: row.replaced_by_token_hash,
        }
    }
}

const REFRESH_TOKEN_COLUMNS: &str = "id, user_id, token_hash, expires_at, created_at, \
     created_by_ip, revoked_at, revoked_by_ip, replaced_by_token_hash";

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let row: Option<RefreshTokenRow> = sqlx::query_as(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding refresh token by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        // token_hash carries a unique index; this is the hot lookup path.
        let row: Option<RefreshTokenRow> = sqlx::query_as(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding refresh token by hash: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, token: &RefreshToken) -> Result<RefreshToken, DomainError> {
        let row: RefreshTokenRow = sqlx::query_as(&format!(
            "INSERT INTO refresh_tokens ({REFRESH_TOKEN_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {REFRESH_TOKEN_COLUMNS}"
        ))
        .bind(token.id)
        .bind(&token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(&token.created_by_ip)
        .bind(token.revoked_at)
        .bind(&token.revoked_by_ip)
        .bind(&token.replaced_by_token_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating refresh token: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn mark_rotated(
        &self,
        id: &Uuid,
        replaced_by_token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError> {
        // The rotation compare-and-swap. The WHERE clause is the whole
        // concurrency story: of N concurrent rotations of one token, the
        // row is unrevoked for exactly one of them.
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $3, revoked_by_ip = $4, replaced_by_token_hash = $2
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(replaced_by_token_hash)
        .bind(at)
        .bind(by_ip)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error rotating refresh token: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke<'a>(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
        by_ip: Option<&'a str>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, revoked_by_ip = $3
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(by_ip)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error revoking refresh token: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
