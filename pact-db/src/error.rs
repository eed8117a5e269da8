//! Datastore error types

use pact_core::error::PactError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PactDbError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    /// A conditional write found the row in an unexpected state
    #[error("Conditional write conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type PactDbResult<T> = Result<T, PactDbError>;

impl From<PactDbError> for PactError {
    fn from(err: PactDbError) -> Self {
        match err {
            PactDbError::NotFound(what) => PactError::NotFound(what),
            // A failed conditional write means the Deal moved out of the
            // expected state underneath the caller
            PactDbError::Conflict(_) => PactError::NotAvailable,
            PactDbError::AlreadyExists(what) => {
                PactError::Storage(format!("duplicate entity: {}", what))
            }
            PactDbError::Storage(msg) => PactError::Storage(msg),
        }
    }
}
