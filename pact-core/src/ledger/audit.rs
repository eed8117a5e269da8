//! Audit Ledger - the append-only event trail

use async_trait::async_trait;

use super::LedgerResult;
use crate::types::{AuditEventType, AuditLogEntry, DealId, RequestContext};

/// Audit Ledger trait
///
/// There is deliberately no update or delete operation: entries are
/// immutable once written and ordering for display is by creation time.
#[async_trait]
pub trait AuditLedger: Send + Sync {
    /// Fetch the trail for a Deal. Authorized for the Deal's creator, or
    /// for a holder of a token that is valid for viewing.
    async fn get_audit_trail(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        token: Option<&str>,
    ) -> LedgerResult<Vec<AuditLogEntry>>;

    /// Count entries of one event type for a Deal
    async fn count_events(
        &self,
        deal_id: &DealId,
        event_type: AuditEventType,
    ) -> LedgerResult<u64>;
}
