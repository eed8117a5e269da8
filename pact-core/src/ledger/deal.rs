//! Deal Ledger - lifecycle transitions other than confirmation

use async_trait::async_trait;

use super::{LedgerResult, QueryOptions};
use crate::types::{AccessToken, Deal, DealDraft, DealId, PublicId, RequestContext};

/// Result of creating a Deal: the Deal plus its single access token
#[derive(Debug, Clone)]
pub struct CreatedDeal {
    pub deal: Deal,
    pub access_token: AccessToken,
}

/// Deal Ledger trait
#[async_trait]
pub trait DealLedger: Send + Sync {
    /// Create a Deal in `pending`, issue its access token, and append
    /// `deal_created`
    async fn create_deal(&self, ctx: &RequestContext, draft: DealDraft)
        -> LedgerResult<CreatedDeal>;

    /// Get a Deal by its internal id
    async fn get_deal(&self, deal_id: &DealId) -> LedgerResult<Option<Deal>>;

    /// Resolve a Deal by its shareable public id
    async fn get_deal_by_public_id(&self, public_id: &PublicId) -> LedgerResult<Option<Deal>>;

    /// Side-effecting read: validate the token for viewing, set
    /// `viewed_at` on the first non-creator view, and append
    /// `deal_viewed` with a counter sourced from the audit log
    async fn record_view(
        &self,
        ctx: &RequestContext,
        public_id: &PublicId,
        token: &str,
    ) -> LedgerResult<Deal>;

    /// Void a pending Deal; creator-only and final
    async fn void_deal(&self, ctx: &RequestContext, deal_id: &DealId) -> LedgerResult<Deal>;

    /// Re-send the recipient notification for a pending Deal and update
    /// `last_nudged_at`; creator-only
    async fn nudge_deal(&self, ctx: &RequestContext, deal_id: &DealId) -> LedgerResult<Deal>;

    /// List Deals created by an account; callers may only list their own
    async fn list_deals_by_creator(
        &self,
        ctx: &RequestContext,
        creator_id: &str,
        options: QueryOptions,
    ) -> LedgerResult<Vec<Deal>>;
}
