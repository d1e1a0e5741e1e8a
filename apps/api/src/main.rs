mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::Services;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::{AppState, Readiness};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_analyzer={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Collaborators are initialized exactly once; failure is served as 503.
    let readiness = Readiness::from_init(Services::initialize(&config));
    match readiness.initialization_error() {
        Some(reason) => {
            warn!("Collaborator initialization failed: {reason}");
            warn!("POST /analyze/ will return 503 Service Unavailable until restarted");
        }
        None => info!(
            "Analysis services initialized (model: {})",
            llm_client::MODEL
        ),
    }

    let app = build_router(AppState::new(readiness), &config).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");
    info!("CORS allow-list for /analyze/: {:?}", config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
