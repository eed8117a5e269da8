//! Application state for the API server

use std::sync::Arc;

use pact_db::{
    AuditService, Collaborators, DealService, MemoryDatastore, SealingService,
    VerificationService,
};

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Deal lifecycle service
    pub deals: Arc<DealService>,
    /// One-time codes and identity proofs
    pub verification: Arc<VerificationService>,
    /// Confirmation and seal re-verification
    pub sealing: Arc<SealingService>,
    /// Audit trail reads
    pub audit: Arc<AuditService>,
    /// API version
    pub version: String,
}

impl AppState {
    /// Create new app state on a datastore with the given collaborators
    pub fn new(datastore: Arc<MemoryDatastore>, collaborators: Collaborators) -> Self {
        let verification = Arc::new(VerificationService::new(
            datastore.clone(),
            collaborators.clone(),
        ));
        let deals = Arc::new(DealService::new(datastore.clone(), collaborators.clone()));
        let sealing = Arc::new(SealingService::new(
            datastore.clone(),
            collaborators,
            verification.clone(),
        ));
        let audit = Arc::new(AuditService::new(datastore));

        Self {
            deals,
            verification,
            sealing,
            audit,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Origins accepted by the CSRF policy; empty means allow all
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            allowed_origins: Vec::new(),
        }
    }
}
