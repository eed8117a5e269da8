//! Audit Ledger service implementation
//!
//! Read-side of the append-only trail. Writes happen inside the other
//! services' transactions; there is no standalone append surface and no
//! update or delete.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use pact_core::error::PactError;
use pact_core::ledger::{AuditLedger, LedgerResult};
use pact_core::types::{AuditEventType, AuditLogEntry, DealId, RequestContext};

use crate::datastore::MemoryDatastore;

/// Audit Ledger service
pub struct AuditService {
    datastore: Arc<MemoryDatastore>,
}

impl AuditService {
    pub fn new(datastore: Arc<MemoryDatastore>) -> Self {
        Self { datastore }
    }
}

#[async_trait]
impl AuditLedger for AuditService {
    async fn get_audit_trail(
        &self,
        ctx: &RequestContext,
        deal_id: &DealId,
        token: Option<&str>,
    ) -> LedgerResult<Vec<AuditLogEntry>> {
        let now = Utc::now();

        let authorized_entries = self.datastore.read(|t| {
            let deal = t.deal(deal_id)?;
            let authorized = ctx.is_creator(&deal.creator_id)
                || token
                    .and_then(|supplied| {
                        t.token(deal_id).map(|stored| {
                            stored.token == supplied
                                && stored.valid_for_viewing(now, deal.status)
                        })
                    })
                    .unwrap_or(false);
            if authorized {
                Some(t.audit_for(deal_id))
            } else {
                None
            }
        })?;

        match authorized_entries {
            Some(entries) => Ok(entries),
            // Unknown deal and unauthorized caller answer identically
            None => Err(PactError::NotAuthorized),
        }
    }

    async fn count_events(
        &self,
        deal_id: &DealId,
        event_type: AuditEventType,
    ) -> LedgerResult<u64> {
        self.datastore.read(|t| t.count_audit(deal_id, event_type))
    }
}
