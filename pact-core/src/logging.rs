//! Logging standards and conventions
//!
//! All modules follow these standards for consistent log output.
//!
//! # Log Levels
//!
//! | Level | Usage | Examples |
//! |-------|-------|----------|
//! | ERROR | Unrecoverable errors, integrity violations | Seal mismatch, storage failure |
//! | WARN  | Recoverable issues, rejected attempts | Token rejected, delivery failure |
//! | INFO  | Lifecycle transitions | Deal created, confirmed, voided |
//! | DEBUG | Detailed operation flow | Guard evaluation, policy checks |
//! | TRACE | Fine-grained debugging | Canonical documents, full parameters |
//!
//! # Structured Logging Fields
//!
//! Always use structured fields for key information:
//!
//! ```ignore
//! use tracing::info;
//!
//! info!(
//!     deal_id = %deal.deal_id,
//!     operation = "deal_confirm",
//!     seal = %seal,
//!     "Deal confirmed"
//! );
//! ```

/// Standard log field names
pub mod fields {
    /// Deal identifier
    pub const DEAL_ID: &str = "deal_id";
    /// Public shareable identifier
    pub const PUBLIC_ID: &str = "public_id";
    /// Audit actor identifier
    pub const ACTOR_ID: &str = "actor_id";
    /// Operation name
    pub const OPERATION: &str = "operation";
    /// Request ID for tracing
    pub const REQUEST_ID: &str = "request_id";
    /// Verification channel (email/phone)
    pub const CHANNEL: &str = "channel";
    /// Error message
    pub const ERROR: &str = "error";
    /// Rate limit bucket
    pub const BUCKET: &str = "bucket";
    /// Seal digest (hex)
    pub const SEAL: &str = "seal";
}

/// Log operation categories for consistent naming
pub mod operations {
    // Lifecycle operations
    pub const DEAL_CREATE: &str = "deal_create";
    pub const DEAL_VIEW: &str = "deal_view";
    pub const DEAL_VOID: &str = "deal_void";
    pub const DEAL_CONFIRM: &str = "deal_confirm";
    pub const DEAL_NUDGE: &str = "deal_nudge";

    // Verification operations
    pub const CODE_ISSUE: &str = "code_issue";
    pub const CODE_VERIFY: &str = "code_verify";

    // Token operations
    pub const TOKEN_VALIDATE: &str = "token_validate";

    // Integrity operations
    pub const SEAL_VERIFY: &str = "seal_verify";
}
