//! Core type definitions for the PACT protocol
//!
//! All types follow these naming conventions:
//! - snake_case for field names
//! - *_id suffix for primary keys
//! - *_ref suffix for references
//! - *_at suffix for timestamps

mod audit;
mod common;
mod context;
mod deal;
mod token;
mod verification;

pub use audit::*;
pub use common::*;
pub use context::*;
pub use deal::*;
pub use token::*;
pub use verification::*;
