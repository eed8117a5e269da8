//! Ledger interfaces for the PACT protocol
//!
//! Four surfaces make up the protocol:
//! - Deal Ledger: lifecycle transitions other than confirmation
//! - Verification Ledger: one-time codes and identity proofs
//! - Sealing: confirmation and independent re-verification
//! - Audit Ledger: the append-only event trail
//!
//! Storage, delivery, and rate limiting stay behind collaborator
//! interfaces; these traits are the protocol itself.

mod audit;
mod deal;
mod sealing;
mod verification;

pub use audit::*;
pub use deal::*;
pub use sealing::*;
pub use verification::*;

use crate::error::PactError;

/// Common result type for ledger operations
pub type LedgerResult<T> = Result<T, PactError>;

/// Ledger query options
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_desc: bool,
}
