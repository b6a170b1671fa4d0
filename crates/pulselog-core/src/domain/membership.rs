// ============================================================================
// Pulselog Core - Membership Entity
// File: crates/pulselog-core/src/domain/membership.rs
// Description: User-Tenant binding with role
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tenant role enumeration. Closed set with the total order
/// Owner > Admin > Member, used for "at least" authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    Owner,
    Admin,
    Member,
}

impl TenantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantRole::Owner => "owner",
            TenantRole::Admin => "admin",
            TenantRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(TenantRole::Owner),
            "admin" => Some(TenantRole::Admin),
            "member" => Some(TenantRole::Member),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TenantRole::Member => 0,
            TenantRole::Admin => 1,
            TenantRole::Owner => 2,
        }
    }

    /// Whether this role satisfies a `minimum` role requirement.
    pub fn at_least(&self, minimum: TenantRole) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl Default for TenantRole {
    fn default() -> Self {
        TenantRole::Member
    }
}

/// Membership entity (User-Tenant relationship). At most one record exists
/// per (user, tenant) pair; the role changes only through
/// [`Membership::change_role`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Membership {
    pub id: Uuid,

    /// Opaque user identifier, issued by the external identity provider.
    #[validate(length(min = 1, max = 255, message = "User id must not be empty"))]
    pub user_id: String,

    pub tenant_id: Uuid,
    pub role: TenantRole,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        user_id: &str,
        tenant_id: Uuid,
        role: TenantRole,
    ) -> Result<Self, validator::ValidationErrors> {
        let membership = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            tenant_id,
            role,
            joined_at: Utc::now(),
        };

        membership.validate()?;
        Ok(membership)
    }

    pub fn change_role(&mut self, role: TenantRole) {
        self.role = role;
    }
}
