//! Sealing engine
//!
//! Orchestrates the confirm transition: token validation, trust-policy
//! re-check, seal computation, and the atomic write that turns a pending
//! Deal into a confirmed one. Also performs independent seal
//! re-verification.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use pact_core::canon::compute_seal;
use pact_core::constants::RATE_BUCKET_DEAL_CONFIRM;
use pact_core::error::PactError;
use pact_core::ledger::{DealSealer, LedgerResult};
use pact_core::policy::requirements_for;
use pact_core::types::{
    AuditMetadata, Deal, DealId, DealStatus, RequestContext, SealVerification, TokenPurpose,
    TokenState, VerificationProof,
};

use crate::datastore::MemoryDatastore;
use crate::services::{ensure_origin, ensure_rate_limit, Collaborators, VerificationService};
use crate::validation::validate_signature_ref;

/// How a confirm attempt resolved inside the transaction; rejections
/// that must keep their audit entries are outcomes, not errors
enum ConfirmOutcome {
    Confirmed(Deal),
    /// Token mismatched, consumed, or expired
    TokenRejected,
    /// Token fine, but the Deal already left `pending`
    DealUnavailable,
    VerificationRequired,
}

/// Sealing engine service
pub struct SealingService {
    datastore: Arc<MemoryDatastore>,
    collaborators: Collaborators,
    verification: Arc<VerificationService>,
}

impl SealingService {
    pub fn new(
        datastore: Arc<MemoryDatastore>,
        collaborators: Collaborators,
        verification: Arc<VerificationService>,
    ) -> Self {
        Self {
            datastore,
            collaborators,
            verification,
        }
    }
}

#[async_trait]
impl DealSealer for SealingService {
    async fn confirm_deal(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        token: &str,
        signature_ref: &str,
        proofs: &[VerificationProof],
    ) -> LedgerResult<Deal> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;
        validate_signature_ref(signature_ref)?;
        ensure_rate_limit(
            self.collaborators.rate_limiter.as_ref(),
            RATE_BUCKET_DEAL_CONFIRM,
            deal_id.as_str(),
        )?;

        for proof in proofs {
            match proof {
                VerificationProof::TrustedIdentity => {
                    self.verification.apply_trusted_identity(ctx, deal_id).await?;
                }
            }
        }

        let now = Utc::now();
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        let outcome = self.datastore.transaction(|t| {
            let Some(deal) = t.deal(deal_id).cloned() else {
                return Err(PactError::NotAvailable);
            };

            let token_ok = t
                .token(deal_id)
                .map(|stored| {
                    stored.token == token
                        && stored.state == TokenState::Unused
                        && !stored.is_expired(now)
                })
                .unwrap_or(false);
            let valid = token_ok && deal.status == DealStatus::Pending;
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::TokenValidated {
                    purpose: TokenPurpose::Signing,
                    outcome: valid,
                },
                now,
            );
            if !valid {
                // A consumed or foreign token is an authorization
                // failure; a good token against a terminal Deal is a
                // state failure
                return Ok(if token_ok {
                    ConfirmOutcome::DealUnavailable
                } else {
                    ConfirmOutcome::TokenRejected
                });
            }

            let records = t.verifications_for(deal_id);
            if !requirements_for(deal.trust_level).satisfied_by(&records) {
                return Ok(ConfirmOutcome::VerificationRequired);
            }

            let seal = compute_seal(deal_id, &deal.terms, signature_ref, now, &records)?;

            t.update_deal_if_status(deal_id, DealStatus::Pending, |d| {
                // Transient marker; the surrounding transaction makes it
                // invisible to any observer
                d.status = DealStatus::Sealing;
                d.signature_ref = Some(signature_ref.to_string());
                d.seal = Some(seal.clone());
                d.confirmed_at = Some(now);
                d.status = DealStatus::Confirmed;
            })?;

            let stored_token = t
                .token_mut(deal_id)
                .ok_or_else(|| PactError::Storage("token missing for deal".to_string()))?;
            stored_token.consume(now);

            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealSigned {
                    signature_ref: signature_ref.to_string(),
                },
                now,
            );
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealConfirmed {
                    seal: seal.to_hex(),
                },
                now,
            );

            let confirmed = t
                .deal(deal_id)
                .cloned()
                .ok_or_else(|| PactError::Storage("deal disappeared during confirm".to_string()))?;
            Ok(ConfirmOutcome::Confirmed(confirmed))
        })?;

        match outcome {
            ConfirmOutcome::Confirmed(deal) => {
                info!(
                    deal_id = %deal.deal_id,
                    operation = "deal_confirm",
                    seal = %deal.seal.as_ref().map(|s| s.to_hex()).unwrap_or_default(),
                    "Deal confirmed and sealed"
                );
                Ok(deal)
            }
            ConfirmOutcome::TokenRejected => {
                warn!(
                    deal_id = %deal_id,
                    operation = "token_validate",
                    "Confirm rejected: token invalid"
                );
                Err(PactError::NotAuthorized)
            }
            ConfirmOutcome::DealUnavailable => {
                warn!(
                    deal_id = %deal_id,
                    operation = "deal_confirm",
                    "Confirm rejected: deal is no longer pending"
                );
                Err(PactError::NotAvailable)
            }
            ConfirmOutcome::VerificationRequired => {
                warn!(
                    deal_id = %deal_id,
                    operation = "deal_confirm",
                    "Confirm rejected: required proofs missing"
                );
                Err(PactError::VerificationRequired)
            }
        }
    }

    async fn verify_deal(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
    ) -> LedgerResult<SealVerification> {
        let now = Utc::now();
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        let (deal, records) = self.datastore.read(|t| {
            (t.deal(deal_id).cloned(), t.verifications_for(deal_id))
        })?;
        let Some(deal) = deal else {
            return Err(PactError::NotFound(format!("deal {}", deal_id)));
        };
        if deal.status != DealStatus::Confirmed {
            return Err(PactError::NotAvailable);
        }
        let (Some(stored), Some(signature_ref), Some(confirmed_at)) =
            (deal.seal.clone(), deal.signature_ref.clone(), deal.confirmed_at)
        else {
            return Err(PactError::Storage(
                "confirmed deal is missing seal fields".to_string(),
            ));
        };

        let computed = compute_seal(deal_id, &deal.terms, &signature_ref, confirmed_at, &records)?;
        let matches = computed == stored;

        self.datastore.transaction(|t| {
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealVerified { matches },
                now,
            );
            Ok(())
        })?;

        if matches {
            info!(deal_id = %deal_id, operation = "seal_verify", "Seal verified");
        } else {
            error!(
                deal_id = %deal_id,
                operation = "seal_verify",
                stored = %stored,
                computed = %computed,
                "Seal mismatch: stored record diverges from recomputation"
            );
        }

        Ok(SealVerification {
            deal_id: deal_id.clone(),
            matches,
            stored,
            computed,
            verified_at: now,
        })
    }
}
