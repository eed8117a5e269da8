//! Deterministic seal computation
//!
//! Canonicalization rules:
//! - terms keep the Deal's insertion order, never resorted
//! - each verification is reduced to `{type, verified_value}` only;
//!   timestamps and method metadata stay out of the digest
//! - the verification list is sorted by type name
//! - the confirmation timestamp is ISO-8601 at second precision
//! - the canonical JSON document is prefixed with a domain tag before
//!   hashing (SHA-256)

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::ProtocolResult;
use crate::types::{DealId, SealDigest, Term, VerificationRecord, VerificationType};

/// Domain separation tags for digest contexts
pub mod domain_tags {
    /// Tag for Deal seal computation
    pub const DEAL_SEAL: &[u8] = b"PACT:DealSeal:v1\0";
    /// Tag for one-time-code hashing
    pub const ONE_TIME_CODE: &[u8] = b"PACT:OneTimeCode:v1\0";
}

#[derive(Serialize)]
struct CanonicalTerm<'a> {
    label: &'a str,
    value: &'a str,
    kind: &'a str,
}

#[derive(Serialize)]
struct CanonicalVerification<'a> {
    #[serde(rename = "type")]
    verification_type: &'a str,
    verified_value: &'a str,
}

/// Fixed-shape document the seal is computed over; field order is the
/// canonical order
#[derive(Serialize)]
struct CanonicalSealDocument<'a> {
    deal_id: &'a str,
    terms: Vec<CanonicalTerm<'a>>,
    signature_ref: &'a str,
    confirmed_at: String,
    verifications: Vec<CanonicalVerification<'a>>,
}

/// Compute the seal digest for a Deal
///
/// Pure and deterministic: identical inputs always yield an identical
/// digest, across implementations, given the same canonicalization rules.
pub fn compute_seal(
    deal_id: &DealId,
    terms: &[Term],
    signature_ref: &str,
    confirmed_at: DateTime<Utc>,
    verifications: &[VerificationRecord],
) -> ProtocolResult<SealDigest> {
    let mut sorted: Vec<&VerificationRecord> = verifications.iter().collect();
    sorted.sort_by_key(|r| r.verification_type.as_str());

    let document = CanonicalSealDocument {
        deal_id: deal_id.as_str(),
        terms: terms
            .iter()
            .map(|t| CanonicalTerm {
                label: &t.label,
                value: &t.value,
                kind: t.kind.as_str(),
            })
            .collect(),
        signature_ref,
        confirmed_at: confirmed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        verifications: sorted
            .iter()
            .map(|r| CanonicalVerification {
                verification_type: r.verification_type.as_str(),
                verified_value: &r.verified_value,
            })
            .collect(),
    };

    let canonical = serde_json::to_vec(&document)?;

    let mut tagged = domain_tags::DEAL_SEAL.to_vec();
    tagged.extend_from_slice(&canonical);

    Ok(SealDigest::sha256(&tagged))
}

/// Compute the stored hash of a one-time code
///
/// The code is bound to its (deal, type, target) context so that a digest
/// captured for one channel can never satisfy another.
pub fn code_digest(
    deal_id: &DealId,
    code_type: VerificationType,
    target: &str,
    code: &str,
) -> SealDigest {
    let mut data = domain_tags::ONE_TIME_CODE.to_vec();
    data.extend_from_slice(deal_id.as_str().as_bytes());
    data.push(0x1f);
    data.extend_from_slice(code_type.as_str().as_bytes());
    data.push(0x1f);
    data.extend_from_slice(target.as_bytes());
    data.push(0x1f);
    data.extend_from_slice(code.as_bytes());
    SealDigest::sha256(&data)
}
