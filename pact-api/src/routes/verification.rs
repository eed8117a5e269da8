//! Identity verification endpoints

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use pact_core::ledger::VerificationLedger;
use pact_core::types::{DealId, VerificationType};

use crate::dto::{SendCodeRequest, VerifyCodeRequest, VerifyCodeResponse};
use crate::error::{ApiError, ApiResult};
use crate::routes::recipient_context;
use crate::state::AppState;

/// Send a one-time code to the recipient's email or phone
pub async fn send_code(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<SendCodeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = recipient_context(&headers);
    let code_type = parse_verification_type(&req.verification_type)?;

    state
        .verification
        .send_code(&ctx, &DealId::new(deal_id), code_type, &req.target)
        .await?;

    // The code travels out-of-band only
    Ok(Json(serde_json::json!({ "sent": true })))
}

/// Check a one-time code and record the proof on success
pub async fn verify_code(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<VerifyCodeRequest>,
) -> ApiResult<Json<VerifyCodeResponse>> {
    let ctx = recipient_context(&headers);
    let code_type = parse_verification_type(&req.verification_type)?;

    let verified = state
        .verification
        .verify_code(&ctx, &DealId::new(deal_id), code_type, &req.target, &req.code)
        .await?;

    Ok(Json(VerifyCodeResponse { verified }))
}

fn parse_verification_type(s: &str) -> ApiResult<VerificationType> {
    VerificationType::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid verification type: {}", s)))
}
