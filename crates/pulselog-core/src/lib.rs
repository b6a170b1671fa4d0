//! # Pulselog Core
//!
//! Domain entities, services, and repository traits for the pulselog
//! credential engine: API key and refresh token lifecycle, tenant
//! membership resolution, and the request-time authentication gate.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, RejectionReason};
