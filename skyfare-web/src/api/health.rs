//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response: status, module name, version and model readiness
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub model_loaded: bool,
}

/// GET /health
///
/// Never triggers a model load; reports whether one has completed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.service.resolver().is_resolved()
        && state.service.resolve_pipeline().is_ok();

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "skyfare-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
