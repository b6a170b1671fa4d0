//! PostgreSQL repository implementations

pub mod api_key_repo_impl;
pub mod membership_repo_impl;
pub mod refresh_token_repo_impl;
pub mod tenant_repo_impl;

pub use api_key_repo_impl::PgApiKeyRepository;
pub use membership_repo_impl::PgMembershipRepository;
pub use refresh_token_repo_impl::PgRefreshTokenRepository;
pub use tenant_repo_impl::PgTenantRepository;
