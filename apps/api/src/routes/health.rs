use axum::Json;
use serde_json::{json, Value};

pub const STATUS_MESSAGE: &str = "AI Resume Analyzer API is running!";

/// GET /
/// Liveness probe. No dependencies on the analysis collaborators.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": STATUS_MESSAGE }))
}
