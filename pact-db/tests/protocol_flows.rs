//! End-to-end protocol flow tests
//!
//! These exercise the full lifecycle against the in-memory datastore:
//! creation, viewing, verification gating, sealing, voiding, and the
//! audit trail.

use std::sync::Arc;

use pact_core::error::PactErrorKind;
use pact_core::ledger::{AuditLedger, DealLedger, DealSealer, QueryOptions, VerificationLedger};
use pact_core::types::{
    AuditEventType, DealDraft, DealStatus, Recipient, RequestContext, Term, TermKind, TokenState,
    TrustLevel, VerificationMethod, VerificationProof, VerificationType,
};
use pact_db::{
    AllowListOrigins, AuditService, Collaborators, DealService, FailingDispatch,
    FixedWindowRateLimiter, MemoryDatastore, RecordingDispatch, SealingService,
    VerificationService,
};

struct TestEnv {
    datastore: Arc<MemoryDatastore>,
    dispatch: Arc<RecordingDispatch>,
    deals: DealService,
    verification: Arc<VerificationService>,
    sealing: SealingService,
    audit: AuditService,
}

fn test_env() -> TestEnv {
    test_env_with(Collaborators::default())
}

fn test_env_with(mut collaborators: Collaborators) -> TestEnv {
    let datastore = Arc::new(MemoryDatastore::new());
    let dispatch = Arc::new(RecordingDispatch::new());
    collaborators.dispatch = dispatch.clone();

    let verification = Arc::new(VerificationService::new(
        datastore.clone(),
        collaborators.clone(),
    ));
    TestEnv {
        deals: DealService::new(datastore.clone(), collaborators.clone()),
        sealing: SealingService::new(
            datastore.clone(),
            collaborators.clone(),
            verification.clone(),
        ),
        audit: AuditService::new(datastore.clone()),
        verification,
        dispatch,
        datastore,
    }
}

fn draft(trust_level: TrustLevel) -> DealDraft {
    DealDraft {
        title: "Personal loan".to_string(),
        terms: vec![Term {
            label: "Amount".to_string(),
            value: "$100".to_string(),
            kind: TermKind::Currency,
        }],
        recipient: Recipient::Guest {
            name: "Sam".to_string(),
            email: Some("sam@example.com".to_string()),
        },
        trust_level,
    }
}

fn creator() -> RequestContext {
    RequestContext::creator("user_1", "req_creator")
}

fn recipient() -> RequestContext {
    RequestContext::recipient("req_recipient")
}

// ============ Lifecycle: create / confirm / re-confirm ============

#[tokio::test]
async fn test_basic_deal_confirm_and_token_single_use() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();
    assert_eq!(created.deal.status, DealStatus::Pending);
    assert!(created.deal.seal.is_none());

    let confirmed = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap();
    assert_eq!(confirmed.status, DealStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());
    let seal = confirmed.seal.clone().expect("confirmed deal has a seal");
    assert!(confirmed.signature_ref.is_some());
    assert!(confirmed.invariants_hold());

    let stored_token = env
        .datastore
        .read(|t| t.token(&deal_id).cloned())
        .unwrap()
        .unwrap();
    assert_eq!(stored_token.state, TokenState::Used);
    assert!(stored_token.used_at.is_some());

    // Second confirm with the consumed token: authorization error, seal
    // untouched
    let err = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-2", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);

    let after = env.deals.get_deal(&deal_id).await.unwrap().unwrap();
    assert_eq!(after.seal, Some(seal));
    assert_eq!(after.signature_ref.as_deref(), Some("sig-1"));
}

#[tokio::test]
async fn test_confirm_writes_signed_and_confirmed_audit_entries() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    env.sealing
        .confirm_deal(&recipient(), &deal_id, &created.access_token.token, "sig-1", &[])
        .await
        .unwrap();

    let trail = env
        .audit
        .get_audit_trail(&creator(), &deal_id, None)
        .await
        .unwrap();
    let events: Vec<AuditEventType> = trail.iter().map(|e| e.event_type).collect();
    assert_eq!(events[0], AuditEventType::DealCreated);
    assert!(events.contains(&AuditEventType::TokenValidated));
    assert!(events.contains(&AuditEventType::DealSigned));
    assert!(events.contains(&AuditEventType::DealConfirmed));

    // deal_signed must precede deal_confirmed
    let signed_pos = events
        .iter()
        .position(|e| *e == AuditEventType::DealSigned)
        .unwrap();
    let confirmed_pos = events
        .iter()
        .position(|e| *e == AuditEventType::DealConfirmed)
        .unwrap();
    assert!(signed_pos < confirmed_pos);
}

// ============ Trust gating ============

#[tokio::test]
async fn test_verified_deal_gates_until_email_proof() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Verified))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();

    // Cannot sign before any verification
    assert!(!env.verification.can_sign(&deal_id).await.unwrap());
    let err = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::VerificationRequired);

    // Prove the email channel with a delivered code
    env.verification
        .send_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com")
        .await
        .unwrap();
    let code = env.dispatch.last_code_for("sam@example.com").unwrap();
    let verified = env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", &code)
        .await
        .unwrap();
    assert!(verified);

    assert!(env.verification.can_sign(&deal_id).await.unwrap());
    let confirmed = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap();
    assert_eq!(confirmed.status, DealStatus::Confirmed);
}

#[tokio::test]
async fn test_strong_deal_requires_both_channels() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Strong))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();

    // Email alone is not enough
    env.verification
        .send_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com")
        .await
        .unwrap();
    let code = env.dispatch.last_code_for("sam@example.com").unwrap();
    assert!(env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", &code)
        .await
        .unwrap());

    let err = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::VerificationRequired);

    // Phone completes the gate
    env.verification
        .send_code(&recipient(), &deal_id, VerificationType::Phone, "+15550100123")
        .await
        .unwrap();
    let code = env.dispatch.last_code_for("+15550100123").unwrap();
    assert!(env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Phone, "+15550100123", &code)
        .await
        .unwrap());

    let confirmed = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap();
    assert_eq!(confirmed.status, DealStatus::Confirmed);

    let records = env.verification.list_verifications(&deal_id).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_trusted_identity_shortcut_writes_record() {
    let env = test_env();

    let mut d = draft(TrustLevel::Verified);
    d.recipient = Recipient::Account {
        user_id: "user_9".to_string(),
        name: "Ana".to_string(),
        verified_email: Some("ana@example.com".to_string()),
    };
    let created = env.deals.create_deal(&creator(), d).await.unwrap();
    let deal_id = created.deal.deal_id.clone();

    let ctx = RequestContext::recipient_account("user_9", "req_ana");
    let confirmed = env
        .sealing
        .confirm_deal(
            &ctx,
            &deal_id,
            &created.access_token.token,
            "sig-ana",
            &[VerificationProof::TrustedIdentity],
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status, DealStatus::Confirmed);

    let records = env.verification.list_verifications(&deal_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].method, VerificationMethod::TrustedIdentity);
    assert_eq!(records[0].verified_value, "ana@example.com");

    // The bypass still produced an email_verified entry for the seal's
    // evidence trail
    let count = env
        .audit
        .count_events(&deal_id, AuditEventType::EmailVerified)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_trusted_identity_denied_for_wrong_account() {
    let env = test_env();

    let mut d = draft(TrustLevel::Verified);
    d.recipient = Recipient::Account {
        user_id: "user_9".to_string(),
        name: "Ana".to_string(),
        verified_email: Some("ana@example.com".to_string()),
    };
    let created = env.deals.create_deal(&creator(), d).await.unwrap();
    let deal_id = created.deal.deal_id.clone();

    let ctx = RequestContext::recipient_account("user_intruder", "req_x");
    let err = env
        .sealing
        .confirm_deal(
            &ctx,
            &deal_id,
            &created.access_token.token,
            "sig-x",
            &[VerificationProof::TrustedIdentity],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::VerificationRequired);
    assert!(env
        .verification
        .list_verifications(&deal_id)
        .await
        .unwrap()
        .is_empty());
}

// ============ One-time codes ============

#[tokio::test]
async fn test_code_replay_fails_second_time() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Verified))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();

    env.verification
        .send_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com")
        .await
        .unwrap();
    let code = env.dispatch.last_code_for("sam@example.com").unwrap();

    let first = env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", &code)
        .await
        .unwrap();
    let second = env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", &code)
        .await
        .unwrap();
    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn test_wrong_code_fails_uniformly() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Verified))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();

    env.verification
        .send_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com")
        .await
        .unwrap();
    let code = env.dispatch.last_code_for("sam@example.com").unwrap();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    assert!(!env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", wrong)
        .await
        .unwrap());
    // Malformed input is indistinguishable from a wrong code
    assert!(!env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", "nope")
        .await
        .unwrap());
    // The real code still works after failed guesses
    assert!(env
        .verification
        .verify_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com", &code)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delivery_failure_keeps_issued_code() {
    let mut collaborators = Collaborators::default();
    collaborators.dispatch = Arc::new(FailingDispatch);

    let datastore = Arc::new(MemoryDatastore::new());
    let deals = DealService::new(datastore.clone(), collaborators.clone());
    let verification = VerificationService::new(datastore.clone(), collaborators.clone());

    let created = deals
        .create_deal(&creator(), draft(TrustLevel::Verified))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();

    // Issuance succeeds even though delivery fails
    verification
        .send_code(&recipient(), &deal_id, VerificationType::Email, "sam@example.com")
        .await
        .unwrap();

    let issued = datastore
        .read(|t| {
            t.usable_code(
                &deal_id,
                VerificationType::Email,
                "sam@example.com",
                chrono::Utc::now(),
            )
            .cloned()
        })
        .unwrap();
    assert!(issued.is_some());
}

// ============ Void ============

#[tokio::test]
async fn test_void_then_confirm_is_state_error() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();

    let voided = env.deals.void_deal(&creator(), &deal_id).await.unwrap();
    assert_eq!(voided.status, DealStatus::Voided);
    assert!(voided.voided_at.is_some());

    let err = env
        .sealing
        .confirm_deal(&recipient(), &deal_id, &created.access_token.token, "sig-1", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAvailable);

    let after = env.deals.get_deal(&deal_id).await.unwrap().unwrap();
    assert_eq!(after.status, DealStatus::Voided);
    assert!(after.seal.is_none());
}

#[tokio::test]
async fn test_void_is_creator_only_and_final() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();

    let err = env
        .deals
        .void_deal(&RequestContext::creator("user_2", "req_other"), &deal_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);

    env.deals.void_deal(&creator(), &deal_id).await.unwrap();
    let err = env.deals.void_deal(&creator(), &deal_id).await.unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAvailable);
}

// ============ Token scoping ============

#[tokio::test]
async fn test_token_never_crosses_deals() {
    let env = test_env();

    let deal_a = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_b = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();

    // A's token against B must fail even though the raw value is known
    let err = env
        .sealing
        .confirm_deal(
            &recipient(),
            &deal_b.deal.deal_id,
            &deal_a.access_token.token,
            "sig-1",
            &[],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);

    let b = env
        .deals
        .get_deal(&deal_b.deal.deal_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(b.status, DealStatus::Pending);
}

// ============ Concurrency ============

#[tokio::test]
async fn test_concurrent_confirms_admit_one_winner() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();

    let recipient_first = recipient();
    let recipient_second = recipient();
    let (first, second) = tokio::join!(
        env.sealing
            .confirm_deal(&recipient_first, &deal_id, &token, "sig-first", &[]),
        env.sealing
            .confirm_deal(&recipient_second, &deal_id, &token, "sig-second", &[]),
    );

    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1);

    // The loser did not overwrite the winner's seal
    let deal = env.deals.get_deal(&deal_id).await.unwrap().unwrap();
    let winner_sig = if first.is_ok() { "sig-first" } else { "sig-second" };
    assert_eq!(deal.signature_ref.as_deref(), Some(winner_sig));
    assert!(deal.invariants_hold());
}

// ============ Viewing ============

#[tokio::test]
async fn test_view_sets_viewed_at_once_and_counts_up() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let public_id = created.deal.public_id.clone();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();

    let first = env
        .deals
        .record_view(&recipient(), &public_id, &token)
        .await
        .unwrap();
    let first_viewed_at = first.viewed_at.expect("first view sets viewed_at");

    let second = env
        .deals
        .record_view(&recipient(), &public_id, &token)
        .await
        .unwrap();
    assert_eq!(second.viewed_at, Some(first_viewed_at));

    let count = env
        .audit
        .count_events(&deal_id, AuditEventType::DealViewed)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let trail = env
        .audit
        .get_audit_trail(&creator(), &deal_id, None)
        .await
        .unwrap();
    let view_indexes: Vec<u64> = trail
        .iter()
        .filter_map(|e| match &e.metadata {
            pact_core::types::AuditMetadata::DealViewed { view_index } => Some(*view_index),
            _ => None,
        })
        .collect();
    assert_eq!(view_indexes, vec![1, 2]);
}

#[tokio::test]
async fn test_view_with_bad_token_rejected_but_audited() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let public_id = created.deal.public_id.clone();
    let deal_id = created.deal.deal_id.clone();

    let err = env
        .deals
        .record_view(&recipient(), &public_id, "not-the-token")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);

    // The rejected validation itself is on the record
    let count = env
        .audit
        .count_events(&deal_id, AuditEventType::TokenValidated)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let deal = env.deals.get_deal(&deal_id).await.unwrap().unwrap();
    assert!(deal.viewed_at.is_none());
}

#[tokio::test]
async fn test_used_token_still_views_confirmed_deal() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let public_id = created.deal.public_id.clone();
    let token = created.access_token.token.clone();

    env.sealing
        .confirm_deal(&recipient(), &deal_id, &token, "sig-1", &[])
        .await
        .unwrap();

    let viewed = env
        .deals
        .record_view(&recipient(), &public_id, &token)
        .await
        .unwrap();
    assert_eq!(viewed.status, DealStatus::Confirmed);
}

// ============ Seal round-trip ============

#[tokio::test]
async fn test_seal_round_trip_and_tamper_detection() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    env.sealing
        .confirm_deal(&recipient(), &deal_id, &created.access_token.token, "sig-1", &[])
        .await
        .unwrap();

    let verification = env
        .sealing
        .verify_deal(&RequestContext::system("req_verify"), &deal_id)
        .await
        .unwrap();
    assert!(verification.matches);
    assert_eq!(verification.stored, verification.computed);

    // Simulate tampering with a term after confirmation
    env.datastore
        .transaction(|t| {
            let deal = t.deal_mut(&deal_id).expect("deal exists");
            deal.terms[0].value = "$1000000".to_string();
            Ok(())
        })
        .unwrap();

    let verification = env
        .sealing
        .verify_deal(&RequestContext::system("req_verify2"), &deal_id)
        .await
        .unwrap();
    assert!(!verification.matches);

    let trail = env
        .audit
        .get_audit_trail(&creator(), &deal_id, None)
        .await
        .unwrap();
    let verdicts: Vec<bool> = trail
        .iter()
        .filter_map(|e| match &e.metadata {
            pact_core::types::AuditMetadata::DealVerified { matches } => Some(*matches),
            _ => None,
        })
        .collect();
    assert_eq!(verdicts, vec![true, false]);
}

#[tokio::test]
async fn test_verify_rejected_for_unconfirmed_deal() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let err = env
        .sealing
        .verify_deal(&RequestContext::system("req_verify"), &created.deal.deal_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAvailable);
}

// ============ Audit trail authorization ============

#[tokio::test]
async fn test_audit_trail_requires_creator_or_token() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    let token = created.access_token.token.clone();

    // Creator reads freely
    assert!(!env
        .audit
        .get_audit_trail(&creator(), &deal_id, None)
        .await
        .unwrap()
        .is_empty());

    // Anonymous caller without a token is turned away
    let err = env
        .audit
        .get_audit_trail(&recipient(), &deal_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);

    // Token holder reads; a wrong creator does not
    assert!(!env
        .audit
        .get_audit_trail(&recipient(), &deal_id, Some(&token))
        .await
        .unwrap()
        .is_empty());
    let err = env
        .audit
        .get_audit_trail(
            &RequestContext::creator("user_2", "req_other"),
            &deal_id,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);
}

// ============ Collaborator gates ============

#[tokio::test]
async fn test_rate_limit_denies_before_state_change() {
    let mut collaborators = Collaborators::default();
    collaborators.rate_limiter = Arc::new(FixedWindowRateLimiter::new(60, 1));

    let datastore = Arc::new(MemoryDatastore::new());
    let deals = DealService::new(datastore.clone(), collaborators);

    deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let err = deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::RateLimited);

    let count = datastore
        .read(|t| t.deals_by_creator("user_1").len())
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_origin_policy_short_circuits_mutations() {
    let mut collaborators = Collaborators::default();
    collaborators.origin_policy = Arc::new(AllowListOrigins::new(["https://app.example.com"]));

    let datastore = Arc::new(MemoryDatastore::new());
    let deals = DealService::new(datastore.clone(), collaborators);

    let err = deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::OriginRejected);

    let allowed_ctx = RequestContext::creator("user_1", "req_1")
        .with_origin("https://app.example.com");
    assert!(deals
        .create_deal(&allowed_ctx, draft(TrustLevel::Basic))
        .await
        .is_ok());
}

// ============ Listing and nudging ============

#[tokio::test]
async fn test_list_deals_by_creator_is_scoped_and_paged() {
    let env = test_env();

    for _ in 0..3 {
        env.deals
            .create_deal(&creator(), draft(TrustLevel::Basic))
            .await
            .unwrap();
    }

    let all = env
        .deals
        .list_deals_by_creator(&creator(), "user_1", QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let page = env
        .deals
        .list_deals_by_creator(
            &creator(),
            "user_1",
            QueryOptions {
                limit: Some(2),
                offset: Some(2),
                order_desc: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);

    let err = env
        .deals
        .list_deals_by_creator(&recipient(), "user_1", QueryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAuthorized);
}

#[tokio::test]
async fn test_nudge_updates_timestamp_and_notifies() {
    let env = test_env();

    let created = env
        .deals
        .create_deal(&creator(), draft(TrustLevel::Basic))
        .await
        .unwrap();
    let deal_id = created.deal.deal_id.clone();
    assert!(created.deal.last_nudged_at.is_none());

    let nudged = env.deals.nudge_deal(&creator(), &deal_id).await.unwrap();
    assert!(nudged.last_nudged_at.is_some());

    let emails = env
        .dispatch
        .sent_messages()
        .iter()
        .filter(|m| matches!(m, pact_db::SentMessage::Email { .. }))
        .count();
    // Creation notice plus the nudge
    assert_eq!(emails, 2);

    env.deals.void_deal(&creator(), &deal_id).await.unwrap();
    let err = env.deals.nudge_deal(&creator(), &deal_id).await.unwrap_err();
    assert_eq!(err.kind(), PactErrorKind::NotAvailable);
}
