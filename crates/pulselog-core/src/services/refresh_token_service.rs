// ============================================================================
// Pulselog Core - Refresh Token Service
// File: crates/pulselog-core/src/services/refresh_token_service.rs
// ============================================================================
//! Refresh token issuance, validation, single-use rotation, and reuse
//! detection

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use pulselog_security::keygen;

use crate::domain::RefreshToken;
use crate::error::{DomainError, RejectionReason};
use crate::repositories::RefreshTokenRepository;

/// A freshly issued token. `plaintext` is returned to the caller exactly
/// once; only its lookup hash is stored.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub plaintext: String,
    pub record: RefreshToken,
}

/// Outcome of a non-consuming validation.
#[derive(Debug, Clone)]
pub enum RefreshTokenValidation {
    Valid(RefreshToken),
    Rejected(RejectionReason),
}

/// Outcome of a rotation attempt.
#[derive(Debug, Clone)]
pub enum RotationOutcome {
    Rotated(IssuedRefreshToken),
    Rejected(RejectionReason),
}

pub struct RefreshTokenService<R: RefreshTokenRepository> {
    tokens: Arc<R>,
    ttl_hours: i64,
}

impl<R: RefreshTokenRepository> RefreshTokenService<R> {
    pub fn new(tokens: Arc<R>, ttl_hours: i64) -> Self {
        Self { tokens, ttl_hours }
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(self.ttl_hours)
    }

    pub async fn issue(
        &self,
        user_id: &str,
        client_ip: &str,
    ) -> Result<IssuedRefreshToken, DomainError> {
        let raw = keygen::generate_refresh_token();
        let token = RefreshToken::new(
            user_id,
            keygen::lookup_hash(&raw),
            self.expiry_from(Utc::now()),
            client_ip,
        );
        let record = self.tokens.create(&token).await?;

        info!("Refresh token issued for user {}", record.user_id);
        Ok(IssuedRefreshToken {
            plaintext: raw,
            record,
        })
    }

    /// Classify an inactive token. A revoked token that carries a
    /// replacement pointer was already consumed by a rotation: presenting
    /// it again is a replay.
    fn rejection_for(token: &RefreshToken, now: DateTime<Utc>) -> Option<RejectionReason> {
        if token.revoked_at.is_some() {
            if token.was_rotated() {
                Some(RejectionReason::ReuseDetected)
            } else {
                Some(RejectionReason::Revoked)
            }
        } else if token.is_expired(now) {
            Some(RejectionReason::Expired)
        } else {
            None
        }
    }

    /// Non-consuming check used by the authentication gate. Reuse detection
    /// still fires here: a replayed token takes its whole descendant chain
    /// down with it.
    pub async fn validate(&self, presented: &str) -> Result<RefreshTokenValidation, DomainError> {
        let now = Utc::now();

        if !keygen::is_well_formed_refresh_token(presented) {
            return Ok(RefreshTokenValidation::Rejected(RejectionReason::Malformed));
        }

        let hash = keygen::lookup_hash(presented);
        let Some(token) = self.tokens.find_by_hash(&hash).await? else {
            return Ok(RefreshTokenValidation::Rejected(RejectionReason::NotFound));
        };

        match Self::rejection_for(&token, now) {
            Some(RejectionReason::ReuseDetected) => {
                self.respond_to_reuse(&token, now).await?;
                Ok(RefreshTokenValidation::Rejected(
                    RejectionReason::ReuseDetected,
                ))
            }
            Some(reason) => Ok(RefreshTokenValidation::Rejected(reason)),
            None => Ok(RefreshTokenValidation::Valid(token)),
        }
    }

    /// Single-use rotation. The presented token is consumed through a
    /// compare-and-swap conditional on "still unrevoked"; of two concurrent
    /// rotations of the same token, exactly one wins and the loser observes
    /// an already-consumed token.
    pub async fn rotate(
        &self,
        presented: &str,
        client_ip: &str,
    ) -> Result<RotationOutcome, DomainError> {
        let now = Utc::now();

        if !keygen::is_well_formed_refresh_token(presented) {
            return Ok(RotationOutcome::Rejected(RejectionReason::Malformed));
        }

        let hash = keygen::lookup_hash(presented);
        let Some(token) = self.tokens.find_by_hash(&hash).await? else {
            return Ok(RotationOutcome::Rejected(RejectionReason::NotFound));
        };

        match Self::rejection_for(&token, now) {
            Some(RejectionReason::ReuseDetected) => {
                self.respond_to_reuse(&token, now).await?;
                return Ok(RotationOutcome::Rejected(RejectionReason::ReuseDetected));
            }
            Some(reason) => return Ok(RotationOutcome::Rejected(reason)),
            None => {}
        }

        let raw_new = keygen::generate_refresh_token();
        let new_hash = keygen::lookup_hash(&raw_new);

        let won = self
            .tokens
            .mark_rotated(&token.id, &new_hash, now, client_ip)
            .await?;
        if !won {
            warn!(
                "Concurrent rotation lost for token {} of user {}",
                token.id, token.user_id
            );
            return Ok(RotationOutcome::Rejected(RejectionReason::ReuseDetected));
        }

        let successor = RefreshToken::new(
            &token.user_id,
            new_hash,
            self.expiry_from(now),
            client_ip,
        );
        let record = self.tokens.create(&successor).await?;

        info!("Refresh token rotated for user {}", record.user_id);
        Ok(RotationOutcome::Rotated(IssuedRefreshToken {
            plaintext: raw_new,
            record,
        }))
    }

    /// Idempotent explicit revoke (logout). No replacement pointer is set.
    pub async fn revoke(&self, token_id: &Uuid, by_ip: Option<&str>) -> Result<(), DomainError> {
        let token = self
            .tokens
            .find_by_id(token_id)
            .await?
            .ok_or(DomainError::RefreshTokenNotFound)?;

        if token.revoked_at.is_some() {
            return Ok(());
        }

        self.tokens.revoke(token_id, Utc::now(), by_ip).await?;
        info!("Refresh token revoked for user {}", token.user_id);
        Ok(())
    }

    /// Reuse response: revoke every descendant reachable through the
    /// replacement pointers, so the stolen chain dies as a whole.
    async fn respond_to_reuse(
        &self,
        replayed: &RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        warn!(
            "Refresh token reuse detected for user {}: revoking descendant chain",
            replayed.user_id
        );

        let mut next_hash = replayed.replaced_by_token_hash.clone();
        while let Some(hash) = next_hash {
            let Some(descendant) = self.tokens.find_by_hash(&hash).await? else {
                break;
            };
            next_hash = descendant.replaced_by_token_hash.clone();
            if descendant.revoked_at.is_none() {
                self.tokens.revoke(&descendant.id, now, None).await?;
            }
        }
        Ok(())
    }
}
