use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Returns service status, version and whether a generative backend is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "generative_backend_configured": state.generator.is_some(),
    }))
}
