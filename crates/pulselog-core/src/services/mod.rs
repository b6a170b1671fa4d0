//! Domain services (business logic)

pub mod api_key_service;
pub mod auth_service;
pub mod membership_service;
pub mod refresh_token_service;
pub mod tenant_service;

pub use api_key_service::{ApiKeyService, ApiKeyValidation, IssuedApiKey};
pub use auth_service::{AuthGate, AuthOutcome, AuthenticatedIdentity};
pub use membership_service::MembershipService;
pub use refresh_token_service::{
    IssuedRefreshToken, RefreshTokenService, RefreshTokenValidation, RotationOutcome,
};
pub use tenant_service::TenantService;
