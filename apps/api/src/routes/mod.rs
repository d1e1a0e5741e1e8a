pub mod health;

use std::convert::Infallible;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::analysis::handlers;
use crate::config::Config;
use crate::state::AppState;

pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route(
            "/analyze/",
            post(handlers::handle_analyze)
                .layer::<_, Infallible>(DefaultBodyLimit::max(config.max_upload_bytes))
                .layer(analyze_cors(&config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// CORS policy for the analyze route: only allow-listed frontend origins.
fn analyze_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
