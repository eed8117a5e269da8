//! Deal lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};

use pact_core::ledger::{DealSealer, DealLedger, QueryOptions};
use pact_core::types::{
    Deal, DealDraft, DealId, PublicId, Recipient, Term, TermKind, TrustLevel, VerificationProof,
};

use crate::dto::{
    ConfirmDealRequest, CreateDealRequest, CreateDealResponse, DealResponse, ListQueryParams,
    PaginatedResponse, RecipientDto, SealVerificationResponse, TermDto, TermResponse,
    ViewDealRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::routes::{creator_context, recipient_context};
use crate::state::AppState;

/// Create a Deal
pub async fn create_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateDealRequest>,
) -> ApiResult<Json<CreateDealResponse>> {
    let ctx = creator_context(&headers)?;
    let draft = DealDraft {
        title: req.title,
        terms: req
            .terms
            .into_iter()
            .map(parse_term)
            .collect::<ApiResult<Vec<Term>>>()?,
        recipient: parse_recipient(req.recipient)?,
        trust_level: parse_trust_level(&req.trust_level)?,
    };

    let created = state.deals.create_deal(&ctx, draft).await?;

    Ok(Json(CreateDealResponse {
        deal: deal_to_response(&created.deal),
        access_token: created.access_token.token,
        token_expires_at: created.access_token.expires_at,
    }))
}

/// Get a Deal by its shareable public id
pub async fn get_deal_by_public_id(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> ApiResult<Json<DealResponse>> {
    let deal = state
        .deals
        .get_deal_by_public_id(&PublicId::new(public_id.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deal {} not found", public_id)))?;

    Ok(Json(deal_to_response(&deal)))
}

/// Open a Deal through its share link (side-effecting view)
pub async fn view_deal(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ViewDealRequest>,
) -> ApiResult<Json<DealResponse>> {
    let ctx = recipient_context(&headers);
    let deal = state
        .deals
        .record_view(&ctx, &PublicId::new(public_id), &req.token)
        .await?;

    Ok(Json(deal_to_response(&deal)))
}

/// Void a pending Deal
pub async fn void_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<DealResponse>> {
    let ctx = creator_context(&headers)?;
    let deal = state.deals.void_deal(&ctx, &DealId::new(deal_id)).await?;
    Ok(Json(deal_to_response(&deal)))
}

/// Nudge the recipient of a pending Deal
pub async fn nudge_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<DealResponse>> {
    let ctx = creator_context(&headers)?;
    let deal = state.deals.nudge_deal(&ctx, &DealId::new(deal_id)).await?;
    Ok(Json(deal_to_response(&deal)))
}

/// Confirm a pending Deal: sign and seal
pub async fn confirm_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ConfirmDealRequest>,
) -> ApiResult<Json<DealResponse>> {
    let ctx = recipient_context(&headers);
    let proofs: Vec<VerificationProof> = if req.trusted_identity {
        vec![VerificationProof::TrustedIdentity]
    } else {
        Vec::new()
    };

    let deal = state
        .sealing
        .confirm_deal(
            &ctx,
            &DealId::new(deal_id),
            &req.token,
            &req.signature_ref,
            &proofs,
        )
        .await?;

    Ok(Json(deal_to_response(&deal)))
}

/// Recompute the seal of a confirmed Deal and compare to the stored value
pub async fn verify_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<SealVerificationResponse>> {
    let ctx = recipient_context(&headers);
    let verification = state
        .sealing
        .verify_deal(&ctx, &DealId::new(deal_id))
        .await?;

    Ok(Json(SealVerificationResponse {
        deal_id: verification.deal_id.to_string(),
        matches: verification.matches,
        stored_seal: verification.stored.to_hex(),
        computed_seal: verification.computed.to_hex(),
        verified_at: verification.verified_at,
    }))
}

/// List the caller's Deals
pub async fn list_deals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListQueryParams>,
) -> ApiResult<Json<PaginatedResponse<DealResponse>>> {
    let ctx = creator_context(&headers)?;
    let creator_id = ctx.actor_id().ok_or(ApiError::Unauthorized)?;

    let options = QueryOptions {
        limit: Some(params.limit),
        offset: Some(params.offset),
        order_desc: params.order_desc,
    };
    let deals = state
        .deals
        .list_deals_by_creator(&ctx, &creator_id, options)
        .await?;

    Ok(Json(PaginatedResponse {
        total: deals.len() as u64,
        items: deals.iter().map(deal_to_response).collect(),
        limit: params.limit,
        offset: params.offset,
    }))
}

// Helper functions

fn parse_trust_level(s: &str) -> ApiResult<TrustLevel> {
    TrustLevel::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid trust level: {}", s)))
}

fn parse_term_kind(s: &str) -> ApiResult<TermKind> {
    TermKind::parse(s).ok_or_else(|| ApiError::Validation(format!("Invalid term kind: {}", s)))
}

fn parse_term(dto: TermDto) -> ApiResult<Term> {
    Ok(Term {
        label: dto.label,
        value: dto.value,
        kind: parse_term_kind(&dto.kind)?,
    })
}

fn parse_recipient(dto: RecipientDto) -> ApiResult<Recipient> {
    Ok(match dto.user_id {
        Some(user_id) => Recipient::Account {
            user_id,
            name: dto.name,
            verified_email: dto.email,
        },
        None => Recipient::Guest {
            name: dto.name,
            email: dto.email,
        },
    })
}

pub(crate) fn deal_to_response(deal: &Deal) -> DealResponse {
    DealResponse {
        deal_id: deal.deal_id.to_string(),
        public_id: deal.public_id.to_string(),
        creator_id: deal.creator_id.clone(),
        title: deal.title.clone(),
        recipient_name: deal.recipient.name().to_string(),
        recipient_email: deal.recipient.email().map(|e| e.to_string()),
        terms: deal
            .terms
            .iter()
            .map(|t| TermResponse {
                label: t.label.clone(),
                value: t.value.clone(),
                kind: t.kind.as_str().to_string(),
            })
            .collect(),
        trust_level: deal.trust_level.as_str().to_string(),
        status: deal.status.as_str().to_string(),
        created_at: deal.created_at,
        viewed_at: deal.viewed_at,
        confirmed_at: deal.confirmed_at,
        voided_at: deal.voided_at,
        last_nudged_at: deal.last_nudged_at,
        signature_ref: deal.signature_ref.clone(),
        seal: deal.seal.as_ref().map(|s| s.to_hex()),
    }
}
