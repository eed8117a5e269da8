//! Protocol constants
//!
//! Centralized constants for the PACT protocol. All magic numbers,
//! protocol-defined limits, and default values live here.

// ============================================================================
// Protocol Versions
// ============================================================================

/// Current protocol version
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Canonicalization version for seal computation
pub const CANONICALIZATION_VERSION: &str = "v1";

// ============================================================================
// Lifetimes
// ============================================================================

/// Access token lifetime in days
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 7;

/// One-time code lifetime in minutes
pub const ONE_TIME_CODE_TTL_MINUTES: i64 = 10;

// ============================================================================
// Size Limits
// ============================================================================

/// One-time codes are numeric with exactly this many digits
pub const ONE_TIME_CODE_DIGITS: usize = 6;

/// Length of the shareable public id
pub const PUBLIC_ID_LENGTH: usize = 10;

/// Maximum terms per Deal
pub const MAX_TERMS: usize = 100;

/// Maximum Deal title length
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum term label length
pub const MAX_TERM_LABEL_LENGTH: usize = 100;

/// Maximum term value length
pub const MAX_TERM_VALUE_LENGTH: usize = 1000;

/// Maximum recipient name length
pub const MAX_RECIPIENT_NAME_LENGTH: usize = 200;

/// Maximum signature reference length
pub const MAX_SIGNATURE_REF_LENGTH: usize = 512;

// ============================================================================
// Rate Limit Buckets
// ============================================================================

/// Bucket consulted before Deal creation
pub const RATE_BUCKET_DEAL_CREATE: &str = "deal_create";

/// Bucket consulted before one-time-code issuance
pub const RATE_BUCKET_CODE_ISSUE: &str = "code_issue";

/// Bucket consulted before confirmation attempts
pub const RATE_BUCKET_DEAL_CONFIRM: &str = "deal_confirm";

/// Bucket consulted before nudging the recipient
pub const RATE_BUCKET_DEAL_NUDGE: &str = "deal_nudge";
