//! PACT API - HTTP surface for the agreement protocol
//!
//! Exposes the produced operations over axum: deal creation, share-link
//! viewing, identity verification, confirmation, voiding, audit trails,
//! and independent seal re-verification.

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{create_server, run_server, start_background_server};
pub use state::{ApiConfig, AppState};
