//! Sealing - confirmation and independent re-verification

use async_trait::async_trait;

use super::LedgerResult;
use crate::types::{Deal, DealId, RequestContext, SealVerification, VerificationProof};

/// Sealing trait: the confirm transition and seal re-verification
#[async_trait]
pub trait DealSealer: Send + Sync {
    /// Confirm a pending Deal: validate the token, apply any
    /// trusted-identity proofs, re-check the trust policy, compute the
    /// seal, and atomically persist signature + seal + status + token
    /// consumption + audit entries. Any failure leaves the Deal
    /// unchanged.
    async fn confirm_deal(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        token: &str,
        signature_ref: &str,
        proofs: &[VerificationProof],
    ) -> LedgerResult<Deal>;

    /// Recompute a confirmed Deal's seal from its stored terms,
    /// signature, verifications, and confirmation time, and compare to
    /// the stored value. A mismatch is a result, not an error.
    async fn verify_deal(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
    ) -> LedgerResult<SealVerification>;
}
