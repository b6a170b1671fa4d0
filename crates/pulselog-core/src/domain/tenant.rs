// ============================================================================
// Pulselog Core - Tenant Entity
// File: crates/pulselog-core/src/domain/tenant.rs
// Description: Tenant identity boundary with soft lifecycle
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tenant entity. The isolation boundary for all data and credentials.
/// Never hard-deleted: deactivation is a soft, reversible transition, and a
/// deactivated tenant invalidates every credential it owns at validation
/// time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Tenant name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 2, max = 100, message = "Slug must be between 2 and 100 characters"))]
    pub slug: String,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(name: &str, slug: &str) -> Result<Self, validator::ValidationErrors> {
        let tenant = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug: slug.trim().to_lowercase(),
            is_active: true,
            created_at: Utc::now(),
            deactivated_at: None,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.is_active = false;
        self.deactivated_at = Some(at);
    }

    pub fn reactivate(&mut self) {
        self.is_active = true;
        self.deactivated_at = None;
    }
}
