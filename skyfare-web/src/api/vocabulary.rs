//! Vocabulary endpoint
//!
//! Supplies the form's select options from the vocabulary the pipeline was
//! fitted on. Fields the encoder did not expose are filled from the built-in
//! defaults and listed in `substituted`.

use axum::{extract::State, Json};
use serde::Serialize;
use skyfare_core::schema::VocabularySource;
use skyfare_core::TravelClass;

use crate::error::ApiResult;
use crate::AppState;

/// Select options for the prediction form
#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    pub airlines: Vec<String>,
    pub source_cities: Vec<String>,
    pub destination_cities: Vec<String>,
    pub travel_classes: Vec<&'static str>,
    /// "derived", "partial" or "fallback"
    pub source: &'static str,
    /// Fields served from the built-in defaults
    pub substituted: Vec<&'static str>,
    pub fallback_reason: Option<String>,
}

impl From<&VocabularySource> for VocabularyResponse {
    fn from(source: &VocabularySource) -> Self {
        let vocabulary = source.vocabulary();
        Self {
            airlines: vocabulary.airlines.clone(),
            source_cities: vocabulary.source_cities.clone(),
            destination_cities: vocabulary.destination_cities.clone(),
            travel_classes: TravelClass::ALL.iter().map(|c| c.as_str()).collect(),
            source: source.kind(),
            substituted: source.substituted_fields().to_vec(),
            fallback_reason: source.fallback_reason().map(str::to_string),
        }
    }
}

/// GET /api/vocabulary
pub async fn get_vocabulary(
    State(state): State<AppState>,
) -> ApiResult<Json<VocabularyResponse>> {
    let response = state
        .run_blocking(|service| Ok(VocabularyResponse::from(service.get_vocabulary()?)))
        .await?;
    Ok(Json(response))
}
