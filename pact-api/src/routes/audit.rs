//! Audit trail endpoints

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};

use pact_core::ledger::AuditLedger;
use pact_core::types::{AuditLogEntry, DealId};

use crate::dto::{AuditEntryResponse, AuditQueryParams, AuditTrailResponse};
use crate::error::{ApiError, ApiResult};
use crate::routes::{creator_context, recipient_context};
use crate::state::AppState;

/// Fetch the audit trail for a Deal
///
/// Creators authenticate through the session layer; recipients authorize
/// with their access token.
pub async fn get_audit_trail(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<AuditQueryParams>,
) -> ApiResult<Json<AuditTrailResponse>> {
    let ctx = match creator_context(&headers) {
        Ok(ctx) => ctx,
        Err(_) => recipient_context(&headers),
    };
    let deal_id = DealId::new(deal_id);

    let entries = state
        .audit
        .get_audit_trail(&ctx, &deal_id, params.token.as_deref())
        .await?;

    Ok(Json(AuditTrailResponse {
        deal_id: deal_id.to_string(),
        total: entries.len() as u64,
        items: entries
            .iter()
            .map(entry_to_response)
            .collect::<ApiResult<Vec<_>>>()?,
    }))
}

fn entry_to_response(entry: &AuditLogEntry) -> ApiResult<AuditEntryResponse> {
    let metadata = serde_json::to_value(&entry.metadata)
        .map_err(|e| ApiError::Validation(format!("Unserializable metadata: {}", e)))?;
    Ok(AuditEntryResponse {
        entry_id: entry.entry_id.clone(),
        event_type: entry.event_type.as_str().to_string(),
        actor_type: entry.actor_type.as_str().to_string(),
        actor_id: entry.actor_id.clone(),
        metadata,
        created_at: entry.created_at,
    })
}
