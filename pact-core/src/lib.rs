//! PACT Core - Agreement Lifecycle & Trust Protocol
//!
//! This crate provides the core types and interfaces for the PACT
//! protocol. PACT lets two parties reach a provable, tamper-evident
//! agreement:
//! - One party drafts terms, the other reviews and signs
//! - A tiered trust policy gates signing behind identity proofs
//! - The result is sealed with a deterministic digest any third party
//!   can recompute and verify
//! - An append-only audit log is both the evidentiary record and an
//!   input to re-verification

pub mod canon;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod policy;
pub mod types;

pub use constants::*;
pub use error::*;
pub use types::*;
