//! Access token types
//!
//! An access token is the single-use credential that lets an otherwise
//! anonymous recipient open and sign one specific Deal. It is issued
//! alongside the Deal, expires after seven days, and is consumed exactly
//! once at successful confirmation. A used token remains retrievable so
//! the holder can re-view the sealed result.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::deal::{DealId, DealStatus};
use crate::constants::ACCESS_TOKEN_TTL_DAYS;

/// Consumption state of an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Unused,
    Used,
}

/// Single-use credential bound to one Deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub deal_id: DealId,
    /// High-entropy unguessable value (32 random bytes, hex encoded)
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: TokenState,
    pub used_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Issue a fresh token for a Deal with the standard 7-day lifetime
    pub fn issue(deal_id: DealId, now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self {
            deal_id,
            token: hex::encode(bytes),
            issued_at: now,
            expires_at: now + Duration::days(ACCESS_TOKEN_TTL_DAYS),
            state: TokenState::Unused,
            used_at: None,
        }
    }

    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at
    }

    /// A token authorizes signing only while unexpired, unused, and the
    /// Deal is still pending
    pub fn valid_for_signing(&self, at: DateTime<Utc>, deal_status: DealStatus) -> bool {
        self.state == TokenState::Unused
            && !self.is_expired(at)
            && deal_status == DealStatus::Pending
    }

    /// A token authorizes viewing while valid for signing, or after
    /// consumption if the Deal reached `confirmed` — a consumed token
    /// proves the holder participated in the signing
    pub fn valid_for_viewing(&self, at: DateTime<Utc>, deal_status: DealStatus) -> bool {
        if self.valid_for_signing(at, deal_status) {
            return true;
        }
        self.state == TokenState::Used && deal_status == DealStatus::Confirmed
    }

    /// Mark the token consumed; called exactly once, inside the atomic
    /// confirm transition
    pub fn consume(&mut self, at: DateTime<Utc>) {
        self.state = TokenState::Used;
        self.used_at = Some(at);
    }
}
