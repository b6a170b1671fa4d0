//! Refresh token repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::RefreshToken;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RefreshToken>, DomainError>;
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;
    async fn create(&self, token: &RefreshToken) -> Result<RefreshToken, DomainError>;
    /// Compare-and-swap consume: mark the token revoked with a replacement
    /// pointer, but only while it is still unrevoked. Returns true when this
    /// caller won the swap. Concurrent rotations of the same token must see
    /// exactly one `true`.
    async fn mark_rotated(
        &self,
        id: &Uuid,
        replaced_by_token_hash: &str,
        at: DateTime<Utc>,
        by_ip: &str,
    ) -> Result<bool, DomainError>;
    /// Idempotent revoke without a replacement pointer (logout, chain
    /// revocation).
    async fn revoke<'a>(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
        by_ip: Option<&'a str>,
    ) -> Result<(), DomainError>;
}
