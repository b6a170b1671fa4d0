//! End-to-end credential lifecycle tests: issuance, validation, revocation,
//! rotation, reuse detection, and the authentication gate, driven over the
//! in-memory repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};

use pulselog_core::domain::TenantRole;
use pulselog_core::error::{DomainError, RejectionReason};
use pulselog_core::services::{
    ApiKeyService, ApiKeyValidation, AuthGate, AuthOutcome, MembershipService,
    RefreshTokenService, RefreshTokenValidation, RotationOutcome, TenantService,
};
use pulselog_infrastructure::{
    InMemoryApiKeyRepository, InMemoryMembershipRepository, InMemoryRefreshTokenRepository,
    InMemoryTenantRepository,
};

const TTL_HOURS: i64 = 168;
const CLIENT_IP: &str = "10.0.0.1";

type Keys = ApiKeyService<InMemoryApiKeyRepository, InMemoryTenantRepository>;
type Tokens = RefreshTokenService<InMemoryRefreshTokenRepository>;
type Gate = AuthGate<
    InMemoryApiKeyRepository,
    InMemoryRefreshTokenRepository,
    InMemoryMembershipRepository,
    InMemoryTenantRepository,
>;

struct TestStack {
    tenants: Arc<InMemoryTenantRepository>,
    keys: Arc<InMemoryApiKeyRepository>,
    tokens: Arc<InMemoryRefreshTokenRepository>,
    memberships: Arc<InMemoryMembershipRepository>,
}

impl TestStack {
    fn new() -> Self {
        Self {
            tenants: Arc::new(InMemoryTenantRepository::new()),
            keys: Arc::new(InMemoryApiKeyRepository::new()),
            tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
            memberships: Arc::new(InMemoryMembershipRepository::new()),
        }
    }

    fn tenant_service(&self) -> TenantService<InMemoryTenantRepository> {
        TenantService::new(self.tenants.clone())
    }

    fn api_key_service(&self) -> Keys {
        ApiKeyService::new(self.keys.clone(), self.tenants.clone())
    }

    fn refresh_token_service(&self) -> Tokens {
        RefreshTokenService::new(self.tokens.clone(), TTL_HOURS)
    }

    fn membership_service(&self) -> MembershipService<InMemoryMembershipRepository> {
        MembershipService::new(self.memberships.clone())
    }

    fn gate(&self) -> Gate {
        AuthGate::new(
            self.api_key_service(),
            self.refresh_token_service(),
            self.membership_service(),
            self.tenants.clone(),
        )
    }
}

mod api_key_lifecycle {
    use super::*;

    #[tokio::test]
    async fn issued_key_validates_then_revocation_is_permanent() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let service = stack.api_key_service();

        let issued = service.issue(tenant.id, "ci-bot", None).await.unwrap();
        assert_eq!(issued.record.name, "ci-bot");

        match service.validate(&issued.plaintext).await.unwrap() {
            ApiKeyValidation::Valid(key) => {
                assert_eq!(key.tenant_id, tenant.id);
                assert!(key.last_used_at.is_some());
            }
            other => panic!("expected valid key, got {:?}", other),
        }

        service.revoke(&issued.record.id).await.unwrap();
        // Idempotent: a second revoke is a no-op, not an error.
        service.revoke(&issued.record.id).await.unwrap();

        for _ in 0..3 {
            let outcome = service.validate(&issued.plaintext).await.unwrap();
            assert!(matches!(
                outcome,
                ApiKeyValidation::Rejected(RejectionReason::Revoked)
            ));
        }
    }

    #[tokio::test]
    async fn expiry_boundary_is_inclusive() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let service = stack.api_key_service();

        let issued = service
            .issue(tenant.id, "short-lived", Some(Utc::now()))
            .await
            .unwrap();

        let outcome = service.validate(&issued.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::Expired)
        ));

        let issued = service
            .issue(tenant.id, "long-lived", Some(Utc::now() + Duration::hours(1)))
            .await
            .unwrap();
        assert!(matches!(
            service.validate(&issued.plaintext).await.unwrap(),
            ApiKeyValidation::Valid(_)
        ));
    }

    #[tokio::test]
    async fn wrong_secret_is_indistinguishable_from_unknown_prefix() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let service = stack.api_key_service();

        let issued = service.issue(tenant.id, "ci-bot", None).await.unwrap();

        // Same prefix, different secret body of the same shape.
        let prefix_part = &issued.plaintext[..4 + 8];
        let tampered = format!("{}{}", prefix_part, "0123456789abcdef".repeat(4));
        let outcome = service.validate(&tampered).await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::NotFound)
        ));

        // Entirely unknown prefix.
        let unknown = format!("plk_{}{}", "00000000", "0123456789abcdef".repeat(4));
        let outcome = service.validate(&unknown).await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::NotFound)
        ));
    }

    #[tokio::test]
    async fn tenant_deactivation_invalidates_keys_without_touching_them() {
        let stack = TestStack::new();
        let tenant_service = stack.tenant_service();
        let tenant = tenant_service.create("Acme", "acme").await.unwrap();
        let service = stack.api_key_service();

        let issued = service.issue(tenant.id, "ci-bot", None).await.unwrap();
        assert!(matches!(
            service.validate(&issued.plaintext).await.unwrap(),
            ApiKeyValidation::Valid(_)
        ));

        tenant_service.deactivate(&tenant.id).await.unwrap();

        let outcome = service.validate(&issued.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            ApiKeyValidation::Rejected(RejectionReason::TenantInactive)
        ));

        // The key record itself is untouched and springs back with the
        // tenant.
        let records = service.list_for_tenant(&tenant.id).await.unwrap();
        assert!(records[0].is_active && records[0].revoked_at.is_none());

        tenant_service.reactivate(&tenant.id).await.unwrap();
        assert!(matches!(
            service.validate(&issued.plaintext).await.unwrap(),
            ApiKeyValidation::Valid(_)
        ));
    }

    #[tokio::test]
    async fn issuance_requires_an_active_tenant() {
        let stack = TestStack::new();
        let tenant_service = stack.tenant_service();
        let tenant = tenant_service.create("Acme", "acme").await.unwrap();
        tenant_service.deactivate(&tenant.id).await.unwrap();

        let err = stack
            .api_key_service()
            .issue(tenant.id, "ci-bot", None)
            .await;
        assert!(matches!(err, Err(DomainError::TenantNotActive)));
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let stack = TestStack::new();
        let tenant_service = stack.tenant_service();
        tenant_service.create("Acme", "acme").await.unwrap();

        let err = tenant_service.create("Acme Two", "ACME").await;
        assert!(matches!(err, Err(DomainError::TenantSlugAlreadyExists(_))));
    }
}

mod refresh_token_rotation {
    use super::*;

    #[tokio::test]
    async fn replayed_token_kills_the_whole_chain() {
        let stack = TestStack::new();
        let service = stack.refresh_token_service();

        let t1 = service.issue("u1", CLIENT_IP).await.unwrap();

        let t2 = match service.rotate(&t1.plaintext, CLIENT_IP).await.unwrap() {
            RotationOutcome::Rotated(issued) => issued,
            other => panic!("expected rotation, got {:?}", other),
        };
        let t3 = match service.rotate(&t2.plaintext, CLIENT_IP).await.unwrap() {
            RotationOutcome::Rotated(issued) => issued,
            other => panic!("expected rotation, got {:?}", other),
        };

        // The live tip of the chain is healthy.
        assert!(matches!(
            service.validate(&t3.plaintext).await.unwrap(),
            RefreshTokenValidation::Valid(_)
        ));

        // Replay of the original token: reuse detected, chain revoked.
        let outcome = service.rotate(&t1.plaintext, CLIENT_IP).await.unwrap();
        assert!(matches!(
            outcome,
            RotationOutcome::Rejected(RejectionReason::ReuseDetected)
        ));

        // Every descendant is now dead, including the previously live tip.
        let outcome = service.validate(&t3.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            RefreshTokenValidation::Rejected(RejectionReason::Revoked)
        ));
        let outcome = service.validate(&t2.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            RefreshTokenValidation::Rejected(RejectionReason::ReuseDetected)
        ));
        assert!(matches!(
            service.rotate(&t3.plaintext, CLIENT_IP).await.unwrap(),
            RotationOutcome::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn explicit_logout_is_revoked_not_reuse() {
        let stack = TestStack::new();
        let service = stack.refresh_token_service();

        let issued = service.issue("u1", CLIENT_IP).await.unwrap();
        service
            .revoke(&issued.record.id, Some("10.0.0.9"))
            .await
            .unwrap();
        // Idempotent.
        service.revoke(&issued.record.id, None).await.unwrap();

        let outcome = service.validate(&issued.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            RefreshTokenValidation::Rejected(RejectionReason::Revoked)
        ));
        let outcome = service.rotate(&issued.plaintext, CLIENT_IP).await.unwrap();
        assert!(matches!(
            outcome,
            RotationOutcome::Rejected(RejectionReason::Revoked)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected_as_expired() {
        let stack = TestStack::new();
        // Zero TTL: expired at the instant of issuance (inclusive boundary).
        let service = RefreshTokenService::new(stack.tokens.clone(), 0);

        let issued = service.issue("u1", CLIENT_IP).await.unwrap();
        let outcome = service.validate(&issued.plaintext).await.unwrap();
        assert!(matches!(
            outcome,
            RefreshTokenValidation::Rejected(RejectionReason::Expired)
        ));
    }

    #[tokio::test]
    async fn only_the_lookup_hash_is_stored() {
        let stack = TestStack::new();
        let service = stack.refresh_token_service();

        let issued = service.issue("u1", CLIENT_IP).await.unwrap();
        assert_ne!(issued.record.token_hash, issued.plaintext);
        assert_eq!(
            issued.record.token_hash,
            pulselog_security::keygen::lookup_hash(&issued.plaintext)
        );
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let stack = TestStack::new();
        let service = stack.refresh_token_service();

        let outcome = service.validate(&"f".repeat(64)).await.unwrap();
        assert!(matches!(
            outcome,
            RefreshTokenValidation::Rejected(RejectionReason::NotFound)
        ));

        let err = service.revoke(&uuid::Uuid::new_v4(), None).await;
        assert!(matches!(err, Err(DomainError::RefreshTokenNotFound)));
    }

    #[tokio::test]
    async fn concurrent_rotation_has_exactly_one_winner() {
        let stack = TestStack::new();
        let service = Arc::new(stack.refresh_token_service());

        let issued = service.issue("u1", CLIENT_IP).await.unwrap();

        let a = {
            let service = service.clone();
            let presented = issued.plaintext.clone();
            tokio::spawn(async move { service.rotate(&presented, "10.0.0.2").await })
        };
        let b = {
            let service = service.clone();
            let presented = issued.plaintext.clone();
            tokio::spawn(async move { service.rotate(&presented, "10.0.0.3").await })
        };

        let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let winners = outcomes
            .iter()
            .filter(|o| matches!(o, RotationOutcome::Rotated(_)))
            .count();
        assert_eq!(winners, 1, "exactly one rotation must win, got {:?}", outcomes);

        // The loser observed an already-consumed token, not a silent double
        // success.
        assert!(outcomes.iter().any(|o| matches!(
            o,
            RotationOutcome::Rejected(RejectionReason::ReuseDetected)
        )));
    }
}

mod membership_roles {
    use super::*;

    #[tokio::test]
    async fn has_role_follows_the_closed_ordering() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let service = stack.membership_service();

        service.grant("owner", tenant.id, TenantRole::Owner).await.unwrap();
        service.grant("admin", tenant.id, TenantRole::Admin).await.unwrap();
        service.grant("member", tenant.id, TenantRole::Member).await.unwrap();

        assert!(service.has_role("owner", &tenant.id, TenantRole::Admin).await.unwrap());
        assert!(service.has_role("admin", &tenant.id, TenantRole::Admin).await.unwrap());
        assert!(!service.has_role("member", &tenant.id, TenantRole::Admin).await.unwrap());
        assert!(!service.has_role("stranger", &tenant.id, TenantRole::Member).await.unwrap());
        assert!(service.has_role("member", &tenant.id, TenantRole::Member).await.unwrap());
    }

    #[tokio::test]
    async fn one_membership_per_user_and_tenant() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let service = stack.membership_service();

        service.grant("u1", tenant.id, TenantRole::Member).await.unwrap();
        let err = service.grant("u1", tenant.id, TenantRole::Admin).await;
        assert!(matches!(err, Err(DomainError::MembershipAlreadyExists)));

        let updated = service
            .change_role("u1", &tenant.id, TenantRole::Admin)
            .await
            .unwrap();
        assert_eq!(updated.role, TenantRole::Admin);

        service.revoke_membership("u1", &tenant.id).await.unwrap();
        assert_eq!(service.resolve_role("u1", &tenant.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn a_user_can_belong_to_several_tenants() {
        let stack = TestStack::new();
        let tenant_service = stack.tenant_service();
        let acme = tenant_service.create("Acme", "acme").await.unwrap();
        let globex = tenant_service.create("Globex", "globex").await.unwrap();
        let service = stack.membership_service();

        service.grant("u1", acme.id, TenantRole::Owner).await.unwrap();
        service.grant("u1", globex.id, TenantRole::Member).await.unwrap();

        let memberships = service.memberships_for_user("u1").await.unwrap();
        assert_eq!(memberships.len(), 2);
        assert!(memberships.iter().any(|m| m.tenant_id == acme.id));
        assert!(memberships.iter().any(|m| m.tenant_id == globex.id));
    }
}

mod authentication_gate {
    use super::*;

    #[tokio::test]
    async fn api_key_yields_a_tenant_scoped_machine_identity() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let issued = stack
            .api_key_service()
            .issue(tenant.id, "ci-bot", None)
            .await
            .unwrap();
        let gate = stack.gate();

        match gate.authenticate(Some(&issued.plaintext), None).await.unwrap() {
            AuthOutcome::Authenticated(identity) => {
                assert_eq!(identity.tenant_id, Some(tenant.id));
                assert_eq!(identity.user_id, None);
                assert_eq!(identity.role, None);
                assert!(identity.is_api_key);
            }
            other => panic!("expected authentication, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn session_credential_attaches_membership_claims() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        stack
            .membership_service()
            .grant("u1", tenant.id, TenantRole::Member)
            .await
            .unwrap();
        let issued = stack
            .refresh_token_service()
            .issue("u1", CLIENT_IP)
            .await
            .unwrap();
        let gate = stack.gate();

        match gate
            .authenticate(Some(&issued.plaintext), Some(&tenant.id))
            .await
            .unwrap()
        {
            AuthOutcome::Authenticated(identity) => {
                assert_eq!(identity.tenant_id, Some(tenant.id));
                assert_eq!(identity.user_id.as_deref(), Some("u1"));
                assert_eq!(identity.role, Some(TenantRole::Member));
                assert!(!identity.is_api_key);
            }
            other => panic!("expected authentication, got {:?}", other),
        }

        // Without a tenant context the identity carries only the user.
        match gate.authenticate(Some(&issued.plaintext), None).await.unwrap() {
            AuthOutcome::Authenticated(identity) => {
                assert_eq!(identity.tenant_id, None);
                assert_eq!(identity.user_id.as_deref(), Some("u1"));
                assert_eq!(identity.role, None);
            }
            other => panic!("expected authentication, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn session_without_membership_is_rejected() {
        let stack = TestStack::new();
        let tenant = stack.tenant_service().create("Acme", "acme").await.unwrap();
        let issued = stack
            .refresh_token_service()
            .issue("u1", CLIENT_IP)
            .await
            .unwrap();
        let gate = stack.gate();

        let outcome = gate
            .authenticate(Some(&issued.plaintext), Some(&tenant.id))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected(RejectionReason::NoMembership)
        ));
    }

    #[tokio::test]
    async fn deactivated_tenant_rejects_the_session_path_too() {
        let stack = TestStack::new();
        let tenant_service = stack.tenant_service();
        let tenant = tenant_service.create("Acme", "acme").await.unwrap();
        stack
            .membership_service()
            .grant("u1", tenant.id, TenantRole::Owner)
            .await
            .unwrap();
        let issued = stack
            .refresh_token_service()
            .issue("u1", CLIENT_IP)
            .await
            .unwrap();
        tenant_service.deactivate(&tenant.id).await.unwrap();
        let gate = stack.gate();

        let outcome = gate
            .authenticate(Some(&issued.plaintext), Some(&tenant.id))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected(RejectionReason::TenantInactive)
        ));
    }
}
