//! Data transfer objects for API requests and responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Deal DTOs ============

/// A single term in a create request
#[derive(Debug, Deserialize)]
pub struct TermDto {
    pub label: String,
    pub value: String,
    /// One of: text, currency, date, number
    pub kind: String,
}

/// The counterparty in a create request
#[derive(Debug, Deserialize)]
pub struct RecipientDto {
    pub name: String,
    pub email: Option<String>,
    /// Linked platform account, when the recipient has one; its email is
    /// treated as platform-verified
    pub user_id: Option<String>,
}

/// Create deal request
#[derive(Debug, Deserialize)]
pub struct CreateDealRequest {
    pub title: String,
    pub terms: Vec<TermDto>,
    pub recipient: RecipientDto,
    /// One of: basic, verified, strong, maximum
    pub trust_level: String,
}

/// Term response
#[derive(Debug, Serialize)]
pub struct TermResponse {
    pub label: String,
    pub value: String,
    pub kind: String,
}

/// Deal response
#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub deal_id: String,
    pub public_id: String,
    pub creator_id: String,
    pub title: String,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub terms: Vec<TermResponse>,
    pub trust_level: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
    pub last_nudged_at: Option<DateTime<Utc>>,
    pub signature_ref: Option<String>,
    /// Hex-encoded seal digest, present once confirmed
    pub seal: Option<String>,
}

/// Create deal response: the Deal plus its single-use access token
#[derive(Debug, Serialize)]
pub struct CreateDealResponse {
    pub deal: DealResponse,
    pub access_token: String,
    pub token_expires_at: DateTime<Utc>,
}

/// View deal request (the token came from the share link)
#[derive(Debug, Deserialize)]
pub struct ViewDealRequest {
    pub token: String,
}

/// Confirm deal request
#[derive(Debug, Deserialize)]
pub struct ConfirmDealRequest {
    pub token: String,
    pub signature_ref: String,
    /// When true, the authenticated recipient account's platform-verified
    /// email is offered as an email proof
    #[serde(default)]
    pub trusted_identity: bool,
}

/// Seal verification response
#[derive(Debug, Serialize)]
pub struct SealVerificationResponse {
    pub deal_id: String,
    pub matches: bool,
    pub stored_seal: String,
    pub computed_seal: String,
    pub verified_at: DateTime<Utc>,
}

// ============ Verification DTOs ============

/// Send verification code request
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    /// One of: email, phone
    pub verification_type: String,
    pub target: String,
}

/// Verify code request
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    /// One of: email, phone
    pub verification_type: String,
    pub target: String,
    pub code: String,
}

/// Verify code response
#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

// ============ Audit DTOs ============

/// One audit trail entry
#[derive(Debug, Serialize)]
pub struct AuditEntryResponse {
    pub entry_id: String,
    pub event_type: String,
    pub actor_type: String,
    pub actor_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Audit trail response
#[derive(Debug, Serialize)]
pub struct AuditTrailResponse {
    pub deal_id: String,
    pub total: u64,
    pub items: Vec<AuditEntryResponse>,
}

/// Query parameters for audit trail reads
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub token: Option<String>,
}

// ============ Listing DTOs ============

fn default_limit() -> u32 {
    50
}

/// Common list query parameters
#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub order_desc: bool,
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub total: u64,
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
}
