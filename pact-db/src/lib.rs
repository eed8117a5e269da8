//! PACT Database Layer
//!
//! Provides the datastore and the service implementations of the PACT
//! ledger traits. The bundled datastore keeps the protocol's durable
//! records in memory behind one exclusive lock, which is exactly enough
//! to honor the protocol's atomicity contract: signature persistence,
//! seal computation, status transition, token consumption, and audit
//! append commit or roll back as one unit. A production deployment swaps
//! the datastore for a store with multi-row transactions and
//! "update only if status = X" conditional writes.

pub mod collaborators;
pub mod datastore;
pub mod error;
pub mod services;
pub mod validation;

pub use collaborators::{
    AllowAllOrigins, AllowListOrigins, DispatchError, FailingDispatch, FixedWindowRateLimiter,
    NotificationDispatch, OriginPolicy, RateLimiter, RecordingDispatch, SentMessage,
};
pub use datastore::{MemoryDatastore, Tables};
pub use error::{PactDbError, PactDbResult};
pub use services::{
    AuditService, Collaborators, DealService, SealingService, VerificationService,
};
