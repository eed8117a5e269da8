//! API route handlers

pub mod audit;
pub mod deal;
pub mod health;
pub mod verification;

use axum::http::HeaderMap;
use axum::{routing::get, routing::post, Router};
use rand::rngs::OsRng;
use rand::RngCore;

use pact_core::types::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Deal lifecycle
        .route("/deals", post(deal::create_deal).get(deal::list_deals))
        // Share-link surface, addressed by public id
        .route("/p/:public_id", get(deal::get_deal_by_public_id))
        .route("/p/:public_id/view", post(deal::view_deal))
        .route("/deals/:deal_id/void", post(deal::void_deal))
        .route("/deals/:deal_id/nudge", post(deal::nudge_deal))
        .route("/deals/:deal_id/confirm", post(deal::confirm_deal))
        .route("/deals/:deal_id/verify", post(deal::verify_deal))
        // Verification
        .route("/deals/:deal_id/codes", post(verification::send_code))
        .route(
            "/deals/:deal_id/codes/verify",
            post(verification::verify_code),
        )
        // Audit
        .route("/deals/:deal_id/audit", get(audit::get_audit_trail))
        // State
        .with_state(state)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Request id from the gateway, or a fresh one
fn request_id(headers: &HeaderMap) -> String {
    header_value(headers, "x-request-id").unwrap_or_else(|| {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        format!("req_{}", hex_lower(&bytes))
    })
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decorate(ctx: RequestContext, headers: &HeaderMap) -> RequestContext {
    let mut ctx = ctx;
    if let Some(origin) = header_value(headers, "origin") {
        ctx = ctx.with_origin(origin);
    }
    if let Some(ip) = header_value(headers, "x-forwarded-for") {
        ctx = ctx.with_source_ip(ip);
    }
    ctx
}

/// Context for creator-side endpoints; the authenticated account id comes
/// from the session layer upstream
pub(crate) fn creator_context(headers: &HeaderMap) -> Result<RequestContext, ApiError> {
    let user_id = header_value(headers, "x-user-id").ok_or(ApiError::Unauthorized)?;
    Ok(decorate(
        RequestContext::creator(user_id, request_id(headers)),
        headers,
    ))
}

/// Context for recipient-side endpoints; the caller may be anonymous or
/// an authenticated account holder
pub(crate) fn recipient_context(headers: &HeaderMap) -> RequestContext {
    let ctx = match header_value(headers, "x-user-id") {
        Some(account_id) => RequestContext::recipient_account(account_id, request_id(headers)),
        None => RequestContext::recipient(request_id(headers)),
    };
    decorate(ctx, headers)
}
