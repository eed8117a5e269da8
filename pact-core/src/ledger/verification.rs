//! Verification Ledger - one-time codes and identity proofs

use async_trait::async_trait;

use super::LedgerResult;
use crate::types::{DealId, RequestContext, VerificationRecord, VerificationType};

/// Verification Ledger trait
#[async_trait]
pub trait VerificationLedger: Send + Sync {
    /// Generate a one-time code for the (deal, type, target) channel,
    /// store only its hash, and deliver the raw code out-of-band. The
    /// code itself is never returned to the caller.
    async fn send_code(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
    ) -> LedgerResult<()>;

    /// Check a supplied code against the stored hash. Returns false on
    /// mismatch, expiry, or replay without revealing which condition
    /// failed; on success consumes the code and upserts a
    /// `VerificationRecord`.
    async fn verify_code(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
        code: &str,
    ) -> LedgerResult<bool>;

    /// True when every proof the Deal's trust level requires has a
    /// corresponding verification record
    async fn can_sign(&self, deal_id: &DealId) -> LedgerResult<bool>;

    /// The verification records currently held for a Deal
    async fn list_verifications(&self, deal_id: &DealId)
        -> LedgerResult<Vec<VerificationRecord>>;
}
