//! # Pulselog Infrastructure
//!
//! Persistence adapters for the credential engine: PostgreSQL repositories
//! and the in-process in-memory repositories used by tests and embedded
//! runs.

pub mod database;
pub mod memory;

pub use database::{
    create_pool, PgApiKeyRepository, PgMembershipRepository, PgRefreshTokenRepository,
    PgTenantRepository,
};
pub use memory::{
    InMemoryApiKeyRepository, InMemoryMembershipRepository, InMemoryRefreshTokenRepository,
    InMemoryTenantRepository,
};
