//! skyfare-web library - flight fare prediction web UI
//!
//! Serves the single-page form and the JSON endpoints it calls. All model
//! handling is delegated to [`skyfare_core::FareService`].

use std::sync::Arc;

use axum::Router;
use skyfare_core::FareService;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Process-wide prediction service (pipeline and vocabulary cached inside)
    pub service: Arc<FareService>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: Arc<FareService>) -> Self {
        Self { service }
    }

    /// Run a service call on the blocking pool
    ///
    /// The first call to the service reads and decodes the model artifact,
    /// so handlers never call it from an async worker directly.
    pub async fn run_blocking<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&FareService) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/vocabulary", get(api::get_vocabulary))
        .route("/api/predict", post(api::predict_fare))
        .route("/api/model", get(api::get_model_info))
        .route("/api/buildinfo", get(api::get_build_info));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfare_core::artifact::ResolverConfig;

    #[tokio::test]
    async fn test_run_blocking_leaves_the_async_thread() {
        let state = AppState::new(Arc::new(FareService::new(&ResolverConfig::default())));
        let caller = std::thread::current().id();

        let worker = state
            .run_blocking(|_| Ok(std::thread::current().id()))
            .await
            .unwrap();

        assert_ne!(caller, worker);
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_service_errors() {
        let state = AppState::new(Arc::new(FareService::new(&ResolverConfig::default())));

        let result: ApiResult<()> = state
            .run_blocking(|_| Err(ApiError::BadRequest("nope".to_string())))
            .await;

        assert!(matches!(result, Err(ApiError::BadRequest(msg)) if msg == "nope"));
    }
}
