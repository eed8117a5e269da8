//! Service implementations of the core ledger traits

mod audit_service;
mod deal_service;
mod sealing_service;
mod verification_service;

pub use audit_service::AuditService;
pub use deal_service::DealService;
pub use sealing_service::SealingService;
pub use verification_service::VerificationService;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pact_core::constants::PUBLIC_ID_LENGTH;
use pact_core::error::{PactError, ProtocolResult};
use pact_core::types::RequestContext;

use crate::collaborators::{
    AllowAllOrigins, FixedWindowRateLimiter, NotificationDispatch, OriginPolicy, RateLimiter,
    RecordingDispatch,
};

/// The external collaborators every service consults
#[derive(Clone)]
pub struct Collaborators {
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub dispatch: Arc<dyn NotificationDispatch>,
    pub origin_policy: Arc<dyn OriginPolicy>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            rate_limiter: Arc::new(FixedWindowRateLimiter::default()),
            dispatch: Arc::new(RecordingDispatch::new()),
            origin_policy: Arc::new(AllowAllOrigins),
        }
    }
}

/// Alphabet for public ids; lookalike characters are left out
const PUBLIC_ID_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Generate a prefixed identifier: timestamp micros plus a process-local
/// sequence number
pub(crate) fn generate_id(prefix: &str, sequence: &AtomicU64) -> String {
    let seq = sequence.fetch_add(1, Ordering::SeqCst);
    let timestamp = Utc::now().timestamp_micros();
    format!("{}_{:016x}_{:08x}", prefix, timestamp, seq)
}

/// Generate a short shareable public id
pub(crate) fn generate_public_id() -> String {
    let mut rng = OsRng;
    (0..PUBLIC_ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..PUBLIC_ID_ALPHABET.len());
            PUBLIC_ID_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a 6-digit one-time code, leading zeros preserved
pub(crate) fn generate_code() -> String {
    let value: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", value)
}

/// Origin/CSRF validation; a failure short-circuits before any state is
/// touched
pub(crate) fn ensure_origin(
    policy: &dyn OriginPolicy,
    ctx: &RequestContext,
) -> ProtocolResult<()> {
    if policy.validate(ctx) {
        Ok(())
    } else {
        Err(PactError::OriginRejected)
    }
}

/// Rate limit check; a deny is an immediate rejection with no state change
pub(crate) fn ensure_rate_limit(
    limiter: &dyn RateLimiter,
    bucket: &str,
    key: &str,
) -> ProtocolResult<()> {
    if limiter.check_rate_limit(bucket, key) {
        Ok(())
    } else {
        Err(PactError::RateLimited(bucket.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_prefixed() {
        let seq = AtomicU64::new(0);
        let a = generate_id("deal", &seq);
        let b = generate_id("deal", &seq);
        assert!(a.starts_with("deal_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_id_shape() {
        let id = generate_public_id();
        assert_eq!(id.len(), PUBLIC_ID_LENGTH);
        assert!(id.bytes().all(|b| PUBLIC_ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_code_has_six_digits_with_leading_zeros() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
