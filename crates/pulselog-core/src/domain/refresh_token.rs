// ============================================================================
// Pulselog Core - Refresh Token Entity
// File: crates/pulselog-core/src/domain/refresh_token.rs
// Description: Single-use rotating session credential
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh token entity. Bound to a user identity, not a tenant; tenant
/// context is resolved through membership at use time. Rotation links
/// records into a forward chain through `replaced_by_token_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,

    /// Opaque user identifier, issued by the external identity provider.
    pub user_id: String,

    /// SHA-256 of the raw token; the raw value is never stored.
    pub token_hash: String,

    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by_ip: String,

    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by_ip: Option<String>,

    /// Hash of the token that replaced this one. Present exactly when this
    /// token was consumed by a rotation.
    pub replaced_by_token_hash: Option<String>,
}

impl RefreshToken {
    pub fn new(
        user_id: &str,
        token_hash: String,
        expires_at: DateTime<Utc>,
        created_by_ip: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            token_hash,
            expires_at,
            created_at: Utc::now(),
            created_by_ip: created_by_ip.to_string(),
            revoked_at: None,
            revoked_by_ip: None,
            replaced_by_token_hash: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && !self.is_expired(now)
    }

    /// One-way, idempotent revocation. Used for explicit logout and for
    /// chain revocation after reuse detection; no replacement pointer is
    /// set.
    pub fn revoke(&mut self, at: DateTime<Utc>, by_ip: Option<&str>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(at);
            self.revoked_by_ip = by_ip.map(|ip| ip.to_string());
        }
    }

    /// Consume this token as part of a rotation: revoke it and point it at
    /// its successor.
    pub fn mark_replaced(&mut self, replacement_hash: &str, at: DateTime<Utc>, by_ip: &str) {
        self.revoke(at, Some(by_ip));
        if self.replaced_by_token_hash.is_none() {
            self.replaced_by_token_hash = Some(replacement_hash.to_string());
        }
    }

    pub fn was_rotated(&self) -> bool {
        self.replaced_by_token_hash.is_some()
    }
}
