//! API server setup

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pact_db::{AllowListOrigins, Collaborators, MemoryDatastore};

use crate::routes::create_router;
use crate::state::{ApiConfig, AppState};

/// Create the API server
pub fn create_server(
    config: &ApiConfig,
    datastore: Arc<MemoryDatastore>,
    mut collaborators: Collaborators,
) -> Result<(Router, SocketAddr), Box<dyn std::error::Error + Send + Sync>> {
    if !config.allowed_origins.is_empty() {
        collaborators.origin_policy =
            Arc::new(AllowListOrigins::new(config.allowed_origins.clone()));
    }

    let state = AppState::new(datastore, collaborators);
    let mut router = create_router(state);

    // Add middleware
    router = router.layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    Ok((router, addr))
}

/// Run the API server
pub async fn run_server(
    config: &ApiConfig,
    datastore: Arc<MemoryDatastore>,
    collaborators: Collaborators,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (router, addr) = create_server(config, datastore, collaborators)?;

    tracing::info!("PACT API server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Start server in background (for testing)
pub async fn start_background_server(
    config: &ApiConfig,
    datastore: Arc<MemoryDatastore>,
    collaborators: Collaborators,
) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
    let (router, addr) = create_server(config, datastore, collaborators)?;

    // Bind to get the actual address (useful when port is 0)
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
