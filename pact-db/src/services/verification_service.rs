//! Verification Ledger service implementation
//!
//! Issues and checks one-time codes, maintains verification records, and
//! evaluates the trust policy against them. Only code hashes are stored;
//! the raw code travels out-of-band through the notification dispatcher.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use pact_core::canon::code_digest;
use pact_core::constants::{ONE_TIME_CODE_TTL_MINUTES, RATE_BUCKET_CODE_ISSUE};
use pact_core::error::PactError;
use pact_core::ledger::{LedgerResult, VerificationLedger};
use pact_core::policy::requirements_for;
use pact_core::types::{
    AuditMetadata, Caller, DealId, DealStatus, OneTimeCode, Recipient, RequestContext,
    VerificationMethod, VerificationRecord, VerificationType,
};

use crate::datastore::MemoryDatastore;
use crate::services::{ensure_origin, ensure_rate_limit, generate_code, Collaborators};
use crate::validation::{is_well_formed_code, validate_target};

/// Verification Ledger service
pub struct VerificationService {
    datastore: Arc<MemoryDatastore>,
    collaborators: Collaborators,
}

impl VerificationService {
    pub fn new(datastore: Arc<MemoryDatastore>, collaborators: Collaborators) -> Self {
        Self {
            datastore,
            collaborators,
        }
    }

    fn otp_sent_metadata(code_type: VerificationType, target: &str) -> AuditMetadata {
        match code_type {
            VerificationType::Email => AuditMetadata::EmailOtpSent {
                target: target.to_string(),
            },
            VerificationType::Phone => AuditMetadata::PhoneOtpSent {
                target: target.to_string(),
            },
        }
    }

    fn verified_metadata(
        code_type: VerificationType,
        target: &str,
        method: VerificationMethod,
    ) -> AuditMetadata {
        match code_type {
            VerificationType::Email => AuditMetadata::EmailVerified {
                target: target.to_string(),
                method,
            },
            VerificationType::Phone => AuditMetadata::PhoneVerified {
                target: target.to_string(),
                method,
            },
        }
    }

    /// Trusted-identity shortcut: when the authenticated caller is the
    /// Deal's linked recipient account and that account carries a
    /// platform-verified email, record an email proof without a fresh
    /// code. Returns whether a record was written.
    ///
    /// The record goes through the same upsert path as a code-based
    /// proof, so the seal computation sees it; an existing email record
    /// is left untouched.
    pub async fn apply_trusted_identity(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
    ) -> LedgerResult<bool> {
        let Caller::Recipient {
            account_id: Some(account_id),
        } = &ctx.caller
        else {
            return Ok(false);
        };
        let account_id = account_id.clone();
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();
        let now = Utc::now();

        let applied = self.datastore.transaction(|t| {
            let Some(deal) = t.deal(deal_id).cloned() else {
                return Err(PactError::NotAvailable);
            };
            let Recipient::Account {
                user_id,
                verified_email: Some(email),
                ..
            } = &deal.recipient
            else {
                return Ok(false);
            };
            if *user_id != account_id {
                return Ok(false);
            }
            if t.verification(deal_id, VerificationType::Email).is_some() {
                return Ok(false);
            }

            t.upsert_verification(VerificationRecord {
                deal_id: deal_id.clone(),
                verification_type: VerificationType::Email,
                verified_value: email.clone(),
                verified_at: now,
                method: VerificationMethod::TrustedIdentity,
            });
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                Self::verified_metadata(
                    VerificationType::Email,
                    email,
                    VerificationMethod::TrustedIdentity,
                ),
                now,
            );
            Ok(true)
        })?;

        if applied {
            info!(
                deal_id = %deal_id,
                operation = "code_verify",
                channel = "email",
                "Email satisfied by trusted identity"
            );
        }
        Ok(applied)
    }
}

#[async_trait]
impl VerificationLedger for VerificationService {
    async fn send_code(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
    ) -> LedgerResult<()> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;
        validate_target(code_type, target)?;
        ensure_rate_limit(
            self.collaborators.rate_limiter.as_ref(),
            RATE_BUCKET_CODE_ISSUE,
            deal_id.as_str(),
        )?;

        let now = Utc::now();
        let code = generate_code();
        let hash = code_digest(deal_id, code_type, target, &code);
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        self.datastore.transaction(|t| {
            let Some(deal) = t.deal(deal_id) else {
                return Err(PactError::NotAvailable);
            };
            if deal.status != DealStatus::Pending {
                return Err(PactError::NotAvailable);
            }

            t.push_code(OneTimeCode {
                deal_id: deal_id.clone(),
                code_type,
                target: target.to_string(),
                code_hash: hash.clone(),
                issued_at: now,
                expires_at: now + Duration::minutes(ONE_TIME_CODE_TTL_MINUTES),
                consumed_at: None,
            });
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                Self::otp_sent_metadata(code_type, target),
                now,
            );
            Ok(())
        })?;

        // The code is issued regardless of delivery; a send failure is
        // logged and surfaced nowhere else
        if let Err(err) = self
            .collaborators
            .dispatch
            .send_code(target, code_type, &code)
            .await
        {
            warn!(
                deal_id = %deal_id,
                channel = code_type.as_str(),
                error = %err,
                "Failed to deliver one-time code"
            );
        }

        info!(
            deal_id = %deal_id,
            operation = "code_issue",
            channel = code_type.as_str(),
            "One-time code issued"
        );
        Ok(())
    }

    async fn verify_code(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
        code: &str,
    ) -> LedgerResult<bool> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;

        // A malformed code is just a wrong code; the caller learns
        // nothing about which condition failed
        if !is_well_formed_code(code) {
            debug!(deal_id = %deal_id, operation = "code_verify", "Malformed code rejected");
            return Ok(false);
        }

        let now = Utc::now();
        let supplied = code_digest(deal_id, code_type, target, code);
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        let verified = self.datastore.transaction(|t| {
            let Some(stored) = t.usable_code_mut(deal_id, code_type, target, now) else {
                return Ok(false);
            };
            if stored.code_hash != supplied {
                return Ok(false);
            }
            stored.consume(now);

            t.upsert_verification(VerificationRecord {
                deal_id: deal_id.clone(),
                verification_type: code_type,
                verified_value: target.to_string(),
                verified_at: now,
                method: VerificationMethod::OneTimeCode,
            });
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                Self::verified_metadata(code_type, target, VerificationMethod::OneTimeCode),
                now,
            );
            Ok(true)
        })?;

        if verified {
            info!(
                deal_id = %deal_id,
                operation = "code_verify",
                channel = code_type.as_str(),
                "Channel verified"
            );
        } else {
            warn!(
                deal_id = %deal_id,
                operation = "code_verify",
                channel = code_type.as_str(),
                "Code verification failed"
            );
        }
        Ok(verified)
    }

    async fn can_sign(&self, deal_id: &DealId) -> LedgerResult<bool> {
        self.datastore.read(|t| {
            let Some(deal) = t.deal(deal_id) else {
                return false;
            };
            let records = t.verifications_for(deal_id);
            requirements_for(deal.trust_level).satisfied_by(&records)
        })
    }

    async fn list_verifications(
        &self,
        deal_id: &DealId,
    ) -> LedgerResult<Vec<VerificationRecord>> {
        self.datastore.read(|t| t.verifications_for(deal_id))
    }
}
