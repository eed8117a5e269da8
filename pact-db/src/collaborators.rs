//! External collaborator interfaces
//!
//! Rate limiting, notification delivery, and origin validation are
//! consumed through these traits; the protocol treats them as opaque.
//! The bundled implementations are enough for tests and single-node
//! deployments.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use thiserror::Error;

use pact_core::types::{RequestContext, VerificationType};

/// Rate limiter consulted before code issuance, deal creation, nudges,
/// and confirmation attempts; a deny is an immediate rejection with no
/// state change
pub trait RateLimiter: Send + Sync {
    /// Returns true when the request may proceed
    fn check_rate_limit(&self, bucket: &str, key: &str) -> bool;
}

/// Fixed-window in-memory rate limiter
pub struct FixedWindowRateLimiter {
    window: Duration,
    max_per_window: u32,
    state: Mutex<HashMap<(String, String), (DateTime<Utc>, u32)>>,
}

impl FixedWindowRateLimiter {
    pub fn new(window_secs: i64, max_per_window: u32) -> Self {
        Self {
            window: Duration::seconds(window_secs),
            max_per_window,
            state: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(60, 120)
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check_rate_limit(&self, bucket: &str, key: &str) -> bool {
        let Ok(mut state) = self.state.lock() else {
            // A poisoned limiter fails closed
            return false;
        };
        let now = Utc::now();
        let entry = state
            .entry((bucket.to_string(), key.to_string()))
            .or_insert((now, 0));
        if now - entry.0 >= self.window {
            *entry = (now, 0);
        }
        if entry.1 >= self.max_per_window {
            return false;
        }
        entry.1 += 1;
        true
    }
}

/// Notification delivery failure
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Out-of-band delivery for codes and deal notifications
///
/// Fire-and-forget from the protocol's perspective: a delivery failure
/// never rolls back an already-issued code or a committed Deal write.
#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    async fn send_code(
        &self,
        target: &str,
        channel: VerificationType,
        code: &str,
    ) -> Result<(), DispatchError>;

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// A message captured by [`RecordingDispatch`]
#[derive(Debug, Clone)]
pub enum SentMessage {
    Code {
        target: String,
        channel: VerificationType,
        code: String,
    },
    Email {
        to: String,
        subject: String,
    },
}

/// Records outgoing messages instead of delivering them; what the tests
/// read delivered codes back out of
#[derive(Debug, Default)]
pub struct RecordingDispatch {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent code delivered to a target, if any
    pub fn last_code_for(&self, target: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter().rev().find_map(|m| match m {
            SentMessage::Code {
                target: t, code, ..
            } if t == target => Some(code.clone()),
            _ => None,
        })
    }
}

#[async_trait]
impl NotificationDispatch for RecordingDispatch {
    async fn send_code(
        &self,
        target: &str,
        channel: VerificationType,
        code: &str,
    ) -> Result<(), DispatchError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| DispatchError(format!("lock poisoned: {}", e)))?;
        sent.push(SentMessage::Code {
            target: target.to_string(),
            channel,
            code: code.to_string(),
        });
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), DispatchError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| DispatchError(format!("lock poisoned: {}", e)))?;
        sent.push(SentMessage::Email {
            to: to.to_string(),
            subject: subject.to_string(),
        });
        Ok(())
    }
}

/// Always-failing dispatcher for exercising delivery-failure paths
#[derive(Debug, Default)]
pub struct FailingDispatch;

#[async_trait]
impl NotificationDispatch for FailingDispatch {
    async fn send_code(
        &self,
        _target: &str,
        _channel: VerificationType,
        _code: &str,
    ) -> Result<(), DispatchError> {
        Err(DispatchError("delivery unavailable".to_string()))
    }

    async fn send_email(
        &self,
        _to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<(), DispatchError> {
        Err(DispatchError("delivery unavailable".to_string()))
    }
}

/// Origin/CSRF validation consulted before any mutating entry point; a
/// failure short-circuits before any state is touched
pub trait OriginPolicy: Send + Sync {
    fn validate(&self, ctx: &RequestContext) -> bool;
}

/// Accepts every request; for tests and non-browser deployments
#[derive(Debug, Default)]
pub struct AllowAllOrigins;

impl OriginPolicy for AllowAllOrigins {
    fn validate(&self, _ctx: &RequestContext) -> bool {
        true
    }
}

/// Accepts only requests whose origin header is on the allow list
#[derive(Debug)]
pub struct AllowListOrigins {
    allowed: HashSet<String>,
}

impl AllowListOrigins {
    pub fn new(origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: origins.into_iter().map(Into::into).collect(),
        }
    }
}

impl OriginPolicy for AllowListOrigins {
    fn validate(&self, ctx: &RequestContext) -> bool {
        match &ctx.origin {
            Some(origin) => self.allowed.contains(origin),
            None => false,
        }
    }
}
