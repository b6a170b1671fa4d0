// ============================================================================
// Pulselog Core - API Key Entity
// File: crates/pulselog-core/src/domain/api_key.rs
// Description: Machine credential scoped to one tenant
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// API key entity. The secret body is stored only as a one-way hash; the
/// short clear prefix exists for indexed lookup and display and is never
/// sufficient for access on its own.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiKey {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Key name must be between 1 and 100 characters"))]
    pub name: String,

    pub key_prefix: String,
    pub secret_hash: String,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn new(
        tenant_id: Uuid,
        name: &str,
        key_prefix: String,
        secret_hash: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, validator::ValidationErrors> {
        let key = Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.trim().to_string(),
            key_prefix,
            secret_hash,
            is_active: true,
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
            revoked_at: None,
        };

        key.validate()?;
        Ok(key)
    }

    /// One-way, idempotent transition: `revoked_at` is set exactly once and
    /// `is_active` is permanently false afterwards.
    pub fn revoke(&mut self, at: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(at);
        }
        self.is_active = false;
    }

    pub fn record_usage(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
    }

    /// Expiry boundary is inclusive: a key is already expired at the instant
    /// `now == expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.revoked_at.is_none() && !self.is_expired(now)
    }
}
