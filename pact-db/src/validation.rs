//! Protocol input validation
//!
//! Validation errors are rejected before any store access. Patterns are
//! compiled once; limits come from the protocol constants.

use once_cell::sync::Lazy;
use regex::Regex;

use pact_core::constants::{
    MAX_RECIPIENT_NAME_LENGTH, MAX_SIGNATURE_REF_LENGTH, MAX_TERMS, MAX_TERM_LABEL_LENGTH,
    MAX_TERM_VALUE_LENGTH, MAX_TITLE_LENGTH, ONE_TIME_CODE_DIGITS,
};
use pact_core::error::{PactError, ProtocolResult};
use pact_core::types::{DealDraft, Recipient, Term, VerificationType};

/// Basic email shape: local part, @, domain with a dot
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex")
});

/// E.164-style phone number: + and 7 to 15 digits
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("Invalid phone regex"));

/// Identifier pattern: alphanumeric with underscores, hyphens, colons, dots
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_:\-\.]{1,64}$").expect("Invalid ID regex"));

fn require_non_empty(value: &str, field: &str) -> ProtocolResult<()> {
    if value.trim().is_empty() {
        return Err(PactError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn require_max_length(value: &str, max: usize, field: &str) -> ProtocolResult<()> {
    if value.len() > max {
        return Err(PactError::Validation(format!(
            "{} exceeds maximum length {} (got {})",
            field,
            max,
            value.len()
        )));
    }
    Ok(())
}

/// Validate an account identifier
pub fn validate_account_id(id: &str, field: &str) -> ProtocolResult<()> {
    if !ID_PATTERN.is_match(id) {
        return Err(PactError::Validation(format!(
            "{} has an invalid format",
            field
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ProtocolResult<()> {
    require_max_length(email, 254, "email")?;
    if !EMAIL_PATTERN.is_match(email) {
        return Err(PactError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> ProtocolResult<()> {
    if !PHONE_PATTERN.is_match(phone) {
        return Err(PactError::Validation(
            "invalid phone number; expected E.164 format".to_string(),
        ));
    }
    Ok(())
}

/// Validate a verification target against its channel type
pub fn validate_target(code_type: VerificationType, target: &str) -> ProtocolResult<()> {
    match code_type {
        VerificationType::Email => validate_email(target),
        VerificationType::Phone => validate_phone(target),
    }
}

/// True when the supplied string even has the shape of a one-time code.
/// Anything else is treated as a wrong code rather than a typed error, so
/// the verify path leaks nothing about why it failed.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == ONE_TIME_CODE_DIGITS && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_signature_ref(signature_ref: &str) -> ProtocolResult<()> {
    require_non_empty(signature_ref, "signature reference")?;
    require_max_length(signature_ref, MAX_SIGNATURE_REF_LENGTH, "signature reference")
}

fn validate_term(term: &Term, index: usize) -> ProtocolResult<()> {
    require_non_empty(&term.label, &format!("term {} label", index))?;
    require_max_length(
        &term.label,
        MAX_TERM_LABEL_LENGTH,
        &format!("term {} label", index),
    )?;
    require_max_length(
        &term.value,
        MAX_TERM_VALUE_LENGTH,
        &format!("term {} value", index),
    )
}

fn validate_recipient(recipient: &Recipient) -> ProtocolResult<()> {
    require_non_empty(recipient.name(), "recipient name")?;
    require_max_length(recipient.name(), MAX_RECIPIENT_NAME_LENGTH, "recipient name")?;
    if let Some(email) = recipient.email() {
        validate_email(email)?;
    }
    if let Some(account_id) = recipient.account_id() {
        validate_account_id(account_id, "recipient account id")?;
    }
    Ok(())
}

/// Validate a full Deal draft before anything touches the store
pub fn validate_draft(draft: &DealDraft) -> ProtocolResult<()> {
    require_non_empty(&draft.title, "title")?;
    require_max_length(&draft.title, MAX_TITLE_LENGTH, "title")?;

    if draft.terms.is_empty() {
        return Err(PactError::Validation(
            "a deal needs at least one term".to_string(),
        ));
    }
    if draft.terms.len() > MAX_TERMS {
        return Err(PactError::Validation(format!(
            "too many terms: maximum is {}",
            MAX_TERMS
        )));
    }
    for (index, term) in draft.terms.iter().enumerate() {
        validate_term(term, index)?;
    }

    validate_recipient(&draft.recipient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::types::{TermKind, TrustLevel};

    fn draft() -> DealDraft {
        DealDraft {
            title: "Loan".to_string(),
            terms: vec![Term {
                label: "Amount".to_string(),
                value: "$100".to_string(),
                kind: TermKind::Currency,
            }],
            recipient: Recipient::Guest {
                name: "Sam".to_string(),
                email: Some("sam@example.com".to_string()),
            },
            trust_level: TrustLevel::Basic,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut d = draft();
        d.title = "  ".to_string();
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn test_empty_terms_rejected() {
        let mut d = draft();
        d.terms.clear();
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn test_oversized_term_value_rejected() {
        let mut d = draft();
        d.terms[0].value = "x".repeat(MAX_TERM_VALUE_LENGTH + 1);
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn test_bad_recipient_email_rejected() {
        let mut d = draft();
        d.recipient = Recipient::Guest {
            name: "Sam".to_string(),
            email: Some("not-an-email".to_string()),
        };
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn test_email_and_phone_patterns() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("missing-at.example.com").is_err());
        assert!(validate_phone("+15550100123").is_ok());
        assert!(validate_phone("555-0100").is_err());
        assert!(validate_phone("+0123456").is_err());
    }

    #[test]
    fn test_code_shape() {
        assert!(is_well_formed_code("042137"));
        assert!(!is_well_formed_code("42137"));
        assert!(!is_well_formed_code("04213a"));
        assert!(!is_well_formed_code("0421377"));
    }

    #[test]
    fn test_signature_ref_limits() {
        assert!(validate_signature_ref("sig-1").is_ok());
        assert!(validate_signature_ref("").is_err());
        assert!(validate_signature_ref(&"x".repeat(MAX_SIGNATURE_REF_LENGTH + 1)).is_err());
    }
}
