//! PACT API server binary

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pact_api::{run_server, ApiConfig};
use pact_db::{Collaborators, MemoryDatastore};

/// PACT agreement protocol API server
#[derive(Parser, Debug)]
#[command(name = "pact-api", version, about)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Disable permissive CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Origin allowed by the CSRF policy; repeatable. No value allows all.
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig {
        host: args.host,
        port: args.port,
        enable_cors: !args.no_cors,
        allowed_origins: args.allowed_origins,
    };

    let datastore = Arc::new(MemoryDatastore::new());
    run_server(&config, datastore, Collaborators::default()).await
}
