//! In-memory repository implementations.
//!
//! Used by the integration test suite and embedded/dev runs. Each store
//! keeps its records under one lock, so the rotation compare-and-swap is
//! serialized per store exactly like the database's conditional update.

pub mod api_key_store;
pub mod membership_store;
pub mod refresh_token_store;
pub mod tenant_store;

pub use api_key_store::InMemoryApiKeyRepository;
pub use membership_store::InMemoryMembershipRepository;
pub use refresh_token_store::InMemoryRefreshTokenRepository;
pub use tenant_store::InMemoryTenantRepository;

use pulselog_core::error::DomainError;

pub(crate) fn poisoned() -> DomainError {
    DomainError::InternalError("store lock poisoned".to_string())
}
