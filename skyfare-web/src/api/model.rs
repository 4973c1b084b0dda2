//! Model diagnostics endpoint
//!
//! Reports which artifact was loaded, how it was decoded and whether the
//! vocabulary came from the encoder, partly from it, or from the built-in
//! defaults.

use axum::{extract::State, Json};
use serde::Serialize;
use skyfare_core::pipeline::PipelineSummary;
use skyfare_core::FareService;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub path: String,
    pub format: &'static str,
    pub pipeline: PipelineSummary,
    pub candidates: Vec<String>,
    pub vocabulary_source: &'static str,
    pub fallback_reason: Option<String>,
    pub airline_count: usize,
    pub city_count: usize,
}

/// GET /api/model
pub async fn get_model_info(
    State(state): State<AppState>,
) -> ApiResult<Json<ModelInfoResponse>> {
    let info = state.run_blocking(model_info).await?;
    Ok(Json(info))
}

fn model_info(service: &FareService) -> ApiResult<ModelInfoResponse> {
    let artifact = service.resolve_pipeline()?;
    let vocabulary = service.get_vocabulary()?;

    Ok(ModelInfoResponse {
        path: artifact.path.display().to_string(),
        format: artifact.format,
        pipeline: artifact.pipeline.summary(),
        candidates: service
            .resolver()
            .candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        vocabulary_source: vocabulary.kind(),
        fallback_reason: vocabulary.fallback_reason().map(str::to_string),
        airline_count: vocabulary.vocabulary().airlines.len(),
        city_count: vocabulary.vocabulary().source_cities.len(),
    })
}
