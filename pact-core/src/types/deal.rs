//! Deal types for the agreement lifecycle
//!
//! A Deal carries the drafted terms, the trust level gating signing, the
//! lifecycle status, and — once confirmed — the signature reference and
//! the seal digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::SealDigest;

/// Deal ID - internal identifier, used for authorization-sensitive operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(pub String);

impl DealId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DealId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public ID - short shareable identifier used in links
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(pub String);

impl PublicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trust level - selects which identity proofs gate signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// No identity proof required
    Basic,
    /// Email proof required
    Verified,
    /// Email and phone proofs required
    Strong,
    /// Email and phone proofs required (reserved for stricter future gates)
    Maximum,
}

impl TrustLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Verified => "verified",
            Self::Strong => "strong",
            Self::Maximum => "maximum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "verified" => Some(Self::Verified),
            "strong" => Some(Self::Strong),
            "maximum" => Some(Self::Maximum),
            _ => None,
        }
    }
}

/// Deal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Awaiting recipient action
    Pending,
    /// Transient in-flight marker during multi-step confirmation;
    /// never observable as a stuck state
    Sealing,
    /// Terminal: signed and sealed
    Confirmed,
    /// Terminal: cancelled by the creator
    Voided,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sealing => "sealing",
            Self::Confirmed => "confirmed",
            Self::Voided => "voided",
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Voided)
    }
}

/// Term value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Text,
    Currency,
    Date,
    Number,
}

impl TermKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Currency => "currency",
            Self::Date => "date",
            Self::Number => "number",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "currency" => Some(Self::Currency),
            "date" => Some(Self::Date),
            "number" => Some(Self::Number),
            _ => None,
        }
    }
}

/// A single agreed term; the list order is fixed at creation and is the
/// canonical order for seal computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub label: String,
    pub value: String,
    pub kind: TermKind,
}

/// The counterparty of a Deal, resolved once at creation time
///
/// A recipient either has no platform account (invited by name, optionally
/// with an email address for delivery) or is a linked account holder whose
/// platform-verified email can satisfy the email proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    /// Known only by name, optionally reachable by email
    Guest {
        name: String,
        email: Option<String>,
    },
    /// Linked platform account; `verified_email` is the address the
    /// platform's own authentication already proved, if any
    Account {
        user_id: String,
        name: String,
        verified_email: Option<String>,
    },
}

impl Recipient {
    pub fn name(&self) -> &str {
        match self {
            Self::Guest { name, .. } => name,
            Self::Account { name, .. } => name,
        }
    }

    /// Email address for notification delivery, if known
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Guest { email, .. } => email.as_deref(),
            Self::Account { verified_email, .. } => verified_email.as_deref(),
        }
    }

    /// Linked account id, if the recipient has one
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Self::Guest { .. } => None,
            Self::Account { user_id, .. } => Some(user_id),
        }
    }
}

/// Inputs for creating a new Deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealDraft {
    pub title: String,
    pub terms: Vec<Term>,
    pub recipient: Recipient,
    pub trust_level: TrustLevel,
}

/// The agreement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub deal_id: DealId,
    pub public_id: PublicId,
    pub creator_id: String,
    pub title: String,
    pub recipient: Recipient,
    pub terms: Vec<Term>,
    pub trust_level: TrustLevel,
    pub status: DealStatus,
    pub created_at: DateTime<Utc>,
    /// Set once, on the first view by a non-creator
    pub viewed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
    pub last_nudged_at: Option<DateTime<Utc>>,
    /// Reference to the stored signature image; set only on confirmation
    pub signature_ref: Option<String>,
    /// The computed seal; set only on confirmation, immutable thereafter
    pub seal: Option<SealDigest>,
}

impl Deal {
    /// Check if the Deal is still open for recipient action
    pub fn is_pending(&self) -> bool {
        self.status == DealStatus::Pending
    }

    /// A Deal is sealed when both the signature reference and the seal
    /// digest are present; the invariant is that they are both null or
    /// both set
    pub fn is_sealed(&self) -> bool {
        self.signature_ref.is_some() && self.seal.is_some()
    }

    /// Check the structural invariants tying status to timestamps and
    /// seal fields
    pub fn invariants_hold(&self) -> bool {
        let seal_pair = self.signature_ref.is_some() == self.seal.is_some();
        let confirmed = (self.status == DealStatus::Confirmed) == self.confirmed_at.is_some();
        let voided = (self.status == DealStatus::Voided) == self.voided_at.is_some();
        seal_pair && confirmed && voided
    }
}

/// Outcome of recomputing a confirmed Deal's seal
///
/// A mismatch is a legitimate verification result, not an error: it
/// signals tampering or a canonicalization divergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealVerification {
    pub deal_id: DealId,
    pub matches: bool,
    pub stored: SealDigest,
    pub computed: SealDigest,
    pub verified_at: DateTime<Utc>,
}
