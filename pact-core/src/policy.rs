//! Trust policy
//!
//! Maps a Deal's trust level to the set of verification proofs that must
//! exist before signing is permitted. The mapping is a pure function; the
//! services evaluate it against the stored verification records.

use serde::{Deserialize, Serialize};

use crate::types::{TrustLevel, VerificationRecord, VerificationType};

/// The proofs a trust level demands before signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRequirements {
    pub email_required: bool,
    pub phone_required: bool,
}

/// Resolve the proofs required for a trust level
///
/// | level    | email | phone |
/// |----------|-------|-------|
/// | basic    | no    | no    |
/// | verified | yes   | no    |
/// | strong   | yes   | yes   |
/// | maximum  | yes   | yes   |
pub fn requirements_for(level: TrustLevel) -> TrustRequirements {
    match level {
        TrustLevel::Basic => TrustRequirements {
            email_required: false,
            phone_required: false,
        },
        TrustLevel::Verified => TrustRequirements {
            email_required: true,
            phone_required: false,
        },
        TrustLevel::Strong | TrustLevel::Maximum => TrustRequirements {
            email_required: true,
            phone_required: true,
        },
    }
}

impl TrustRequirements {
    /// The required proof types that have no matching record yet
    pub fn missing_proofs(&self, records: &[VerificationRecord]) -> Vec<VerificationType> {
        let mut missing = Vec::new();
        if self.email_required
            && !records
                .iter()
                .any(|r| r.verification_type == VerificationType::Email)
        {
            missing.push(VerificationType::Email);
        }
        if self.phone_required
            && !records
                .iter()
                .any(|r| r.verification_type == VerificationType::Phone)
        {
            missing.push(VerificationType::Phone);
        }
        missing
    }

    /// True when every required proof has a corresponding record
    pub fn satisfied_by(&self, records: &[VerificationRecord]) -> bool {
        self.missing_proofs(records).is_empty()
    }
}
