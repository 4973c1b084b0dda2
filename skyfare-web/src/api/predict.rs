//! Fare prediction endpoint
//!
//! Checks the submitted form against the vocabulary and declared ranges,
//! then hands the query to the core. Currency formatting happens here.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use skyfare_core::{FareService, FlightQuery};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Successful prediction response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    /// Raw estimate in INR
    pub fare_inr: f64,
    /// Display form, e.g. "₹ 12,345.68"
    pub formatted: String,
}

/// POST /api/predict
pub async fn predict_fare(
    State(state): State<AppState>,
    payload: Result<Json<FlightQuery>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let request_id = Uuid::new_v4();
    let Json(query) = payload.map_err(|e| {
        info!("[{}] malformed request body: {}", request_id, e.body_text());
        ApiError::from(e)
    })?;

    let (query, fare) = state
        .run_blocking(move |service| {
            check_form(service, &query)?;
            let fare = service.predict(&query).map_err(|e| {
                info!("[{}] prediction rejected: {}", request_id, e);
                ApiError::from(e)
            })?;
            Ok((query, fare))
        })
        .await?;

    info!(
        "[{}] {} {}→{} {} stops={} days_left={}: {:.2}",
        request_id,
        query.airline,
        query.source_city,
        query.destination_city,
        query.travel_class,
        query.stops_num,
        query.days_left,
        fare
    );

    Ok(Json(PredictResponse {
        request_id,
        fare_inr: fare,
        formatted: format_inr(fare),
    }))
}

/// Form-side checks: categorical values must come from the vocabulary and
/// numeric fields must be within their input ranges
fn check_form(service: &FareService, query: &FlightQuery) -> ApiResult<()> {
    let source = service.get_vocabulary()?;
    let vocabulary = source.vocabulary();

    if !vocabulary.has_airline(&query.airline) {
        return Err(ApiError::BadRequest(format!("Unknown airline: {}", query.airline)));
    }
    if !vocabulary.has_source(&query.source_city) {
        return Err(ApiError::BadRequest(format!(
            "Unknown source city: {}",
            query.source_city
        )));
    }
    if !vocabulary.has_destination(&query.destination_city) {
        return Err(ApiError::BadRequest(format!(
            "Unknown destination city: {}",
            query.destination_city
        )));
    }

    if let Some((field, value)) = query.out_of_range().first() {
        return Err(ApiError::BadRequest(format!("{} out of range: {}", field, value)));
    }

    Ok(())
}

/// Format an INR amount with thousands separators and two decimals
pub fn format_inr(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("₹ {}.{}", grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr_groups_thousands() {
        assert_eq!(format_inr(5000.0), "₹ 5,000.00");
        assert_eq!(format_inr(12345.678), "₹ 12,345.68");
        assert_eq!(format_inr(1234567.0), "₹ 1,234,567.00");
    }

    #[test]
    fn test_format_inr_small_values() {
        assert_eq!(format_inr(0.0), "₹ 0.00");
        assert_eq!(format_inr(999.994), "₹ 999.99");
    }
}
