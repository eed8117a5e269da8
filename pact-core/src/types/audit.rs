//! Audit log types
//!
//! The audit log is the append-only evidentiary record of a Deal's life.
//! Event types form a closed enumeration and each event carries its own
//! known metadata shape, so the log stays testable rather than a bag of
//! untyped JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deal::{DealId, TrustLevel};
use super::verification::VerificationMethod;

/// Who triggered an audited event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Creator,
    Recipient,
    System,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Recipient => "recipient",
            Self::System => "system",
        }
    }
}

/// Closed enumeration of audited event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    DealCreated,
    DealViewed,
    DealSigned,
    DealConfirmed,
    DealVoided,
    EmailOtpSent,
    EmailVerified,
    PhoneOtpSent,
    PhoneVerified,
    TokenValidated,
    DealVerified,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DealCreated => "deal_created",
            Self::DealViewed => "deal_viewed",
            Self::DealSigned => "deal_signed",
            Self::DealConfirmed => "deal_confirmed",
            Self::DealVoided => "deal_voided",
            Self::EmailOtpSent => "email_otp_sent",
            Self::EmailVerified => "email_verified",
            Self::PhoneOtpSent => "phone_otp_sent",
            Self::PhoneVerified => "phone_verified",
            Self::TokenValidated => "token_validated",
            Self::DealVerified => "deal_verified",
        }
    }
}

/// What a token validation was authorizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Signing,
    Viewing,
}

/// Event-specific metadata, tagged by event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditMetadata {
    DealCreated {
        trust_level: TrustLevel,
        term_count: usize,
    },
    DealViewed {
        /// 1-based counter sourced from the count of prior
        /// `deal_viewed` entries for the Deal
        view_index: u64,
    },
    DealSigned {
        signature_ref: String,
    },
    DealConfirmed {
        /// Hex-encoded seal digest
        seal: String,
    },
    DealVoided {
        voided_by: String,
    },
    EmailOtpSent {
        target: String,
    },
    EmailVerified {
        target: String,
        method: VerificationMethod,
    },
    PhoneOtpSent {
        target: String,
    },
    PhoneVerified {
        target: String,
        method: VerificationMethod,
    },
    TokenValidated {
        purpose: TokenPurpose,
        outcome: bool,
    },
    DealVerified {
        matches: bool,
    },
}

impl AuditMetadata {
    /// The event type this metadata belongs to
    pub fn event_type(&self) -> AuditEventType {
        match self {
            Self::DealCreated { .. } => AuditEventType::DealCreated,
            Self::DealViewed { .. } => AuditEventType::DealViewed,
            Self::DealSigned { .. } => AuditEventType::DealSigned,
            Self::DealConfirmed { .. } => AuditEventType::DealConfirmed,
            Self::DealVoided { .. } => AuditEventType::DealVoided,
            Self::EmailOtpSent { .. } => AuditEventType::EmailOtpSent,
            Self::EmailVerified { .. } => AuditEventType::EmailVerified,
            Self::PhoneOtpSent { .. } => AuditEventType::PhoneOtpSent,
            Self::PhoneVerified { .. } => AuditEventType::PhoneVerified,
            Self::TokenValidated { .. } => AuditEventType::TokenValidated,
            Self::DealVerified { .. } => AuditEventType::DealVerified,
        }
    }
}

/// One immutable audit row; entries are never updated, deleted, or
/// reordered once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub entry_id: String,
    pub deal_id: DealId,
    pub event_type: AuditEventType,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub metadata: AuditMetadata,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Build an entry; the event type is derived from the metadata so the
    /// two can never disagree
    pub fn new(
        entry_id: String,
        deal_id: DealId,
        actor_type: ActorType,
        actor_id: Option<String>,
        metadata: AuditMetadata,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id,
            deal_id,
            event_type: metadata.event_type(),
            actor_type,
            actor_id,
            metadata,
            created_at,
        }
    }
}
