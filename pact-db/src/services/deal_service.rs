//! Deal Ledger service implementation
//!
//! Owns the lifecycle transitions other than confirmation: create, view,
//! void, nudge. Every transition commits its audit entry in the same
//! transaction as the state change.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::{info, warn};

use pact_core::constants::{RATE_BUCKET_DEAL_CREATE, RATE_BUCKET_DEAL_NUDGE};
use pact_core::error::PactError;
use pact_core::ledger::{CreatedDeal, DealLedger, LedgerResult, QueryOptions};
use pact_core::types::{
    AccessToken, AuditEventType, AuditMetadata, Caller, Deal, DealDraft, DealId, DealStatus,
    PublicId, RequestContext, TokenPurpose,
};

use crate::datastore::MemoryDatastore;
use crate::services::{
    ensure_origin, ensure_rate_limit, generate_id, generate_public_id, Collaborators,
};
use crate::validation::validate_draft;

/// Deal Ledger service
pub struct DealService {
    datastore: Arc<MemoryDatastore>,
    collaborators: Collaborators,
    sequence: AtomicU64,
}

impl DealService {
    pub fn new(datastore: Arc<MemoryDatastore>, collaborators: Collaborators) -> Self {
        Self {
            datastore,
            collaborators,
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl DealLedger for DealService {
    async fn create_deal(
        &self,
        ctx: &RequestContext,
        draft: DealDraft,
    ) -> LedgerResult<CreatedDeal> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;
        validate_draft(&draft)?;

        let Caller::Creator { user_id } = &ctx.caller else {
            return Err(PactError::NotAuthorized);
        };
        let creator_id = user_id.clone();
        ensure_rate_limit(
            self.collaborators.rate_limiter.as_ref(),
            RATE_BUCKET_DEAL_CREATE,
            &creator_id,
        )?;

        let now = Utc::now();
        let deal_id = DealId::new(generate_id("deal", &self.sequence));
        let token = AccessToken::issue(deal_id.clone(), now);
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        let created = self.datastore.transaction(|t| {
            let mut public_id = generate_public_id();
            while t.public_id_taken(&public_id) {
                public_id = generate_public_id();
            }

            let deal = Deal {
                deal_id: deal_id.clone(),
                public_id: PublicId::new(public_id),
                creator_id: creator_id.clone(),
                title: draft.title.clone(),
                recipient: draft.recipient.clone(),
                terms: draft.terms.clone(),
                trust_level: draft.trust_level,
                status: DealStatus::Pending,
                created_at: now,
                viewed_at: None,
                confirmed_at: None,
                voided_at: None,
                last_nudged_at: None,
                signature_ref: None,
                seal: None,
            };
            t.insert_deal(deal.clone(), token.clone())?;
            t.append_audit(
                &deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealCreated {
                    trust_level: deal.trust_level,
                    term_count: deal.terms.len(),
                },
                now,
            );
            Ok(deal)
        })?;

        // Delivery is fire-and-forget: a failed notification never
        // reverses the committed Deal
        if let Some(email) = created.recipient.email() {
            let subject = format!("You have a deal to review: {}", created.title);
            if let Err(err) = self
                .collaborators
                .dispatch
                .send_email(email, &subject, "A deal is waiting for your signature.")
                .await
            {
                warn!(
                    deal_id = %created.deal_id,
                    error = %err,
                    "Failed to deliver deal notification"
                );
            }
        }

        info!(
            deal_id = %created.deal_id,
            public_id = %created.public_id,
            operation = "deal_create",
            trust_level = created.trust_level.as_str(),
            "Deal created"
        );

        Ok(CreatedDeal {
            deal: created,
            access_token: token,
        })
    }

    async fn get_deal(&self, deal_id: &DealId) -> LedgerResult<Option<Deal>> {
        self.datastore.read(|t| t.deal(deal_id).cloned())
    }

    async fn get_deal_by_public_id(&self, public_id: &PublicId) -> LedgerResult<Option<Deal>> {
        self.datastore.read(|t| t.deal_by_public_id(public_id).cloned())
    }

    async fn record_view(
        &self,
        ctx: &RequestContext,
        public_id: &PublicId,
        token: &str,
    ) -> LedgerResult<Deal> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;

        let now = Utc::now();
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();
        let is_creator_view = |deal: &Deal| ctx.is_creator(&deal.creator_id);

        // The failed-validation audit entry must survive even though the
        // view itself is rejected, so rejection is a committed outcome
        // rather than a rolled-back error
        let viewed = self.datastore.transaction(|t| {
            let Some(deal) = t.deal_by_public_id(public_id).cloned() else {
                return Err(PactError::NotFound(format!("deal {}", public_id)));
            };
            let deal_id = deal.deal_id.clone();

            let valid = t
                .token(&deal_id)
                .map(|stored| {
                    stored.token == token && stored.valid_for_viewing(now, deal.status)
                })
                .unwrap_or(false);
            t.append_audit(
                &deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::TokenValidated {
                    purpose: TokenPurpose::Viewing,
                    outcome: valid,
                },
                now,
            );
            if !valid {
                return Ok(None);
            }

            if !is_creator_view(&deal) {
                if let Some(deal) = t.deal_mut(&deal_id) {
                    if deal.viewed_at.is_none() {
                        deal.viewed_at = Some(now);
                    }
                }
            }

            let view_index = t.count_audit(&deal_id, AuditEventType::DealViewed) + 1;
            t.append_audit(
                &deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealViewed { view_index },
                now,
            );

            Ok(t.deal(&deal_id).cloned())
        })?;

        let deal = viewed.ok_or(PactError::NotAuthorized)?;
        info!(
            deal_id = %deal.deal_id,
            operation = "deal_view",
            "Deal viewed"
        );
        Ok(deal)
    }

    async fn void_deal(&self, ctx: &RequestContext, deal_id: &DealId) -> LedgerResult<Deal> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;

        let now = Utc::now();
        let actor_type = ctx.actor_type();
        let actor_id = ctx.actor_id();

        let deal = self.datastore.transaction(|t| {
            let Some(deal) = t.deal(deal_id).cloned() else {
                return Err(PactError::NotFound(format!("deal {}", deal_id)));
            };
            if !ctx.is_creator(&deal.creator_id) {
                return Err(PactError::NotAuthorized);
            }
            if deal.status != DealStatus::Pending {
                return Err(PactError::NotAvailable);
            }

            t.update_deal_if_status(deal_id, DealStatus::Pending, |d| {
                d.status = DealStatus::Voided;
                d.voided_at = Some(now);
            })?;
            t.append_audit(
                deal_id,
                actor_type,
                actor_id.clone(),
                AuditMetadata::DealVoided {
                    voided_by: actor_id.clone().unwrap_or_default(),
                },
                now,
            );
            Ok(t.deal(deal_id).cloned().ok_or_else(|| {
                PactError::Storage("deal disappeared during void".to_string())
            })?)
        })?;

        info!(deal_id = %deal.deal_id, operation = "deal_void", "Deal voided");
        Ok(deal)
    }

    async fn nudge_deal(&self, ctx: &RequestContext, deal_id: &DealId) -> LedgerResult<Deal> {
        ensure_origin(self.collaborators.origin_policy.as_ref(), ctx)?;

        let current = self
            .datastore
            .read(|t| t.deal(deal_id).cloned())?
            .ok_or_else(|| PactError::NotFound(format!("deal {}", deal_id)))?;
        if !ctx.is_creator(&current.creator_id) {
            return Err(PactError::NotAuthorized);
        }
        if current.status != DealStatus::Pending {
            return Err(PactError::NotAvailable);
        }
        ensure_rate_limit(
            self.collaborators.rate_limiter.as_ref(),
            RATE_BUCKET_DEAL_NUDGE,
            deal_id.as_str(),
        )?;

        let now = Utc::now();
        let deal = self.datastore.transaction(|t| {
            t.update_deal_if_status(deal_id, DealStatus::Pending, |d| {
                d.last_nudged_at = Some(now);
            })?;
            Ok(t.deal(deal_id).cloned().ok_or_else(|| {
                PactError::Storage("deal disappeared during nudge".to_string())
            })?)
        })?;

        if let Some(email) = deal.recipient.email() {
            let subject = format!("Reminder: {} is waiting for you", deal.title);
            if let Err(err) = self
                .collaborators
                .dispatch
                .send_email(email, &subject, "The deal is still waiting for your signature.")
                .await
            {
                warn!(deal_id = %deal.deal_id, error = %err, "Failed to deliver nudge");
            }
        }

        info!(deal_id = %deal.deal_id, operation = "deal_nudge", "Recipient nudged");
        Ok(deal)
    }

    async fn list_deals_by_creator(
        &self,
        ctx: &RequestContext,
        creator_id: &str,
        options: QueryOptions,
    ) -> LedgerResult<Vec<Deal>> {
        if !ctx.is_creator(creator_id) {
            return Err(PactError::NotAuthorized);
        }

        let mut deals = self.datastore.read(|t| t.deals_by_creator(creator_id))?;
        deals.sort_by_key(|d| d.created_at);
        if options.order_desc {
            deals.reverse();
        }

        let offset = options.offset.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(deals.into_iter().skip(offset).take(limit).collect())
    }
}
