//! Error types for the PACT protocol
//!
//! The taxonomy separates validation, authorization, state, collaborator,
//! and rate-limit failures. Authorization and state variants deliberately
//! carry no detail about which specific check failed, so callers cannot
//! enumerate valid tokens or codes from error messages.

use thiserror::Error;

/// Protocol errors
#[derive(Error, Debug)]
pub enum PactError {
    /// Malformed input, rejected before any store access
    #[error("Validation error: {0}")]
    Validation(String),

    /// Wrong actor, token-deal mismatch, expired or used token; the
    /// message is generic on purpose
    #[error("Not authorized")]
    NotAuthorized,

    /// The Deal is not in a state that admits the requested transition
    #[error("Deal not available")]
    NotAvailable,

    /// Lookup by an identifier the caller is allowed to probe
    #[error("Not found: {0}")]
    NotFound(String),

    /// The required identity proofs are not yet in place
    #[error("Deal cannot be signed yet")]
    VerificationRequired,

    /// An external rate limiter denied the request before any state change
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Request failed origin/CSRF validation before any state was touched
    #[error("Origin rejected")]
    OriginRejected,

    /// Durable store failure; retryable
    #[error("Storage error: {0}")]
    Storage(String),

    /// Notification dispatch failure; retryable, never reverses a
    /// committed write
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for protocol operations
pub type ProtocolResult<T> = Result<T, PactError>;

/// Discriminant of [`PactError`], for matching on the class of failure
/// without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PactErrorKind {
    Validation,
    NotAuthorized,
    NotAvailable,
    NotFound,
    VerificationRequired,
    RateLimited,
    OriginRejected,
    Storage,
    Notification,
    Serialization,
}

impl PactError {
    pub fn kind(&self) -> PactErrorKind {
        match self {
            Self::Validation(_) => PactErrorKind::Validation,
            Self::NotAuthorized => PactErrorKind::NotAuthorized,
            Self::NotAvailable => PactErrorKind::NotAvailable,
            Self::NotFound(_) => PactErrorKind::NotFound,
            Self::VerificationRequired => PactErrorKind::VerificationRequired,
            Self::RateLimited(_) => PactErrorKind::RateLimited,
            Self::OriginRejected => PactErrorKind::OriginRejected,
            Self::Storage(_) => PactErrorKind::Storage,
            Self::Notification(_) => PactErrorKind::Notification,
            Self::Serialization(_) => PactErrorKind::Serialization,
        }
    }
}
