//! Request context
//!
//! Every protocol entry point takes an explicit `RequestContext` instead
//! of reading ambient global state. The context identifies the caller as
//! resolved by the platform's authentication layer, plus the transport
//! facts the origin policy and audit trail care about.

use serde::{Deserialize, Serialize};

use super::audit::ActorType;

/// The caller of a protocol operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Caller {
    /// An authenticated account acting as the Deal's creator
    Creator { user_id: String },
    /// The recipient side; `account_id` is set when the recipient is
    /// also an authenticated account holder
    Recipient { account_id: Option<String> },
    /// Internal machinery (expiry sweeps, re-verification jobs)
    System,
}

/// Per-request context passed into every entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub caller: Caller,
    pub source_ip: Option<String>,
    pub origin: Option<String>,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(caller: Caller, request_id: impl Into<String>) -> Self {
        Self {
            caller,
            source_ip: None,
            origin: None,
            request_id: request_id.into(),
        }
    }

    pub fn creator(user_id: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            Caller::Creator {
                user_id: user_id.into(),
            },
            request_id,
        )
    }

    pub fn recipient(request_id: impl Into<String>) -> Self {
        Self::new(Caller::Recipient { account_id: None }, request_id)
    }

    pub fn recipient_account(
        account_id: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(
            Caller::Recipient {
                account_id: Some(account_id.into()),
            },
            request_id,
        )
    }

    pub fn system(request_id: impl Into<String>) -> Self {
        Self::new(Caller::System, request_id)
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_source_ip(mut self, ip: impl Into<String>) -> Self {
        self.source_ip = Some(ip.into());
        self
    }

    /// The audit actor type for this caller
    pub fn actor_type(&self) -> ActorType {
        match self.caller {
            Caller::Creator { .. } => ActorType::Creator,
            Caller::Recipient { .. } => ActorType::Recipient,
            Caller::System => ActorType::System,
        }
    }

    /// The audit actor id, when the caller is a known account
    pub fn actor_id(&self) -> Option<String> {
        match &self.caller {
            Caller::Creator { user_id } => Some(user_id.clone()),
            Caller::Recipient { account_id } => account_id.clone(),
            Caller::System => None,
        }
    }

    /// True when the caller is the given creator account
    pub fn is_creator(&self, creator_id: &str) -> bool {
        matches!(&self.caller, Caller::Creator { user_id } if user_id == creator_id)
    }
}
