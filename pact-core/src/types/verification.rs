//! Identity verification types
//!
//! A `VerificationRecord` is the durable proof that the recipient controls
//! a claimed channel; a `OneTimeCode` is the ephemeral artifact used to
//! produce one. Only the hash of a code is ever stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::SealDigest;
use super::deal::DealId;

/// Channel being proven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationType {
    Email,
    Phone,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }
}

/// How a verification record was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// A one-time code was delivered to the channel and echoed back
    OneTimeCode,
    /// The platform's own authentication already proved the channel
    TrustedIdentity,
}

/// Durable proof of a recipient-controlled channel
///
/// At most one record exists per (Deal, type); re-verification upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub deal_id: DealId,
    pub verification_type: VerificationType,
    /// The email address or phone number that was proven
    pub verified_value: String,
    pub verified_at: DateTime<Utc>,
    pub method: VerificationMethod,
}

/// Ephemeral proof artifact; never a verification record itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimeCode {
    pub deal_id: DealId,
    pub code_type: VerificationType,
    /// The email or phone the code was delivered to
    pub target: String,
    /// SHA-256 hash of the code; the raw code is never stored
    pub code_hash: SealDigest,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OneTimeCode {
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at
    }

    /// A code is usable until it expires or is consumed, whichever first
    pub fn is_usable(&self, at: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && !self.is_expired(at)
    }

    pub fn consume(&mut self, at: DateTime<Utc>) {
        self.consumed_at = Some(at);
    }
}

/// Claims a caller may attach to a confirm attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationProof {
    /// The authenticated recipient account's platform-verified email
    /// should count as an email proof
    TrustedIdentity,
}
