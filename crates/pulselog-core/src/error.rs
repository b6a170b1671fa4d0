//! Domain errors and the credential rejection taxonomy

use thiserror::Error;

/// Infrastructure and administrative failures. Expected credential
/// rejections are not errors; they are [`RejectionReason`] values carried
/// in service outcomes.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant not active")]
    TenantNotActive,

    #[error("Tenant slug already exists: {0}")]
    TenantSlugAlreadyExists(String),

    #[error("Membership not found")]
    MembershipNotFound,

    #[error("User already in tenant")]
    MembershipAlreadyExists,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("API key not found")]
    ApiKeyNotFound,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Secret hash error: {0}")]
    SecretHashError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Terminal outcome of a single credential validation. None of these are
/// retried internally; `ReuseDetected` is security-relevant and should
/// trigger full session invalidation upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No credential was given — a "try other scheme" signal, not an error.
    NotPresented,
    /// The credential string does not parse into a valid shape.
    Malformed,
    /// Unknown credential. Deliberately covers both "unknown prefix" and
    /// "wrong secret" so callers cannot enumerate issued prefixes.
    NotFound,
    Expired,
    Revoked,
    /// A rotated refresh token was presented again.
    ReuseDetected,
    TenantInactive,
    /// The verified user has no membership in the requested tenant.
    NoMembership,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::NotPresented => "not_presented",
            RejectionReason::Malformed => "malformed",
            RejectionReason::NotFound => "not_found",
            RejectionReason::Expired => "expired",
            RejectionReason::Revoked => "revoked",
            RejectionReason::ReuseDetected => "reuse_detected",
            RejectionReason::TenantInactive => "tenant_inactive",
            RejectionReason::NoMembership => "no_membership",
        }
    }
}
