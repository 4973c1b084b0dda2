//! Prediction invocation
//!
//! Validates a [`FlightQuery`], runs a one-record batch through the pipeline
//! and reads back the single estimate. Formatting is left to the caller.

use tracing::{debug, error, warn};

use crate::error::PredictError;
use crate::pipeline::PredictionPipeline;
use crate::query::FlightQuery;

/// Fare estimate in INR, unrounded and non-negative
pub type FareEstimate = f64;

pub type PredictionResult = Result<FareEstimate, PredictError>;

/// Preconditions checked before the pipeline is touched
pub fn validate(query: &FlightQuery) -> Result<(), PredictError> {
    if query.same_route() {
        return Err(PredictError::InvalidQuery(
            "same source and destination".to_string(),
        ));
    }

    let violations = query.out_of_range();
    if !violations.is_empty() {
        // The form enforces these ranges; reaching here means a caller bypassed it
        let detail: Vec<String> = violations
            .iter()
            .map(|(field, value)| format!("{}={}", field, value))
            .collect();
        error!("Query range contract violated: {}", detail.join(", "));
        return Err(PredictError::InvalidQuery(format!(
            "out of range: {}",
            detail.join(", ")
        )));
    }

    Ok(())
}

/// Validate `query` and predict its fare with `pipeline`
pub fn invoke(pipeline: &dyn PredictionPipeline, query: &FlightQuery) -> PredictionResult {
    validate(query)?;

    let record = query.to_record();
    let output = pipeline.predict(std::slice::from_ref(&record)).map_err(|e| {
        error!("Pipeline prediction error: {}", e);
        PredictError::PredictionFailed(e.to_string())
    })?;

    let value = match output.as_slice() {
        [value] => *value,
        other => {
            return Err(PredictError::PredictionFailed(format!(
                "expected 1 prediction, got {}",
                other.len()
            )))
        }
    };

    if !value.is_finite() {
        return Err(PredictError::PredictionFailed(format!(
            "non-finite prediction: {}",
            value
        )));
    }

    if value < 0.0 {
        warn!("Negative fare estimate {} clamped to 0", value);
        return Ok(0.0);
    }

    debug!(
        "Predicted {} for {} {}→{} ({})",
        value, query.airline, query.source_city, query.destination_city, query.travel_class
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FeatureRecord, PipelineError};
    use crate::query::TravelClass;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        output: Result<Vec<f64>, PipelineError>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(output: Result<Vec<f64>, PipelineError>) -> Self {
            Self {
                output,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PredictionPipeline for Fixed {
        fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError> {
            assert_eq!(batch.len(), 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output.clone()
        }
    }

    fn query() -> FlightQuery {
        FlightQuery {
            airline: "IndiGo".to_string(),
            source_city: "Delhi".to_string(),
            destination_city: "Mumbai".to_string(),
            travel_class: TravelClass::Economy,
            stops_num: 1,
            duration_mins: 135,
            dep_hour: 7,
            dep_min: 15,
            arr_hour: 9,
            arr_min: 30,
            days_left: 14,
        }
    }

    #[test]
    fn test_fixed_prediction_returned_unchanged() {
        let p = Fixed::new(Ok(vec![5000.0]));
        assert_eq!(invoke(&p, &query()), Ok(5000.0));
    }

    #[test]
    fn test_same_route_never_reaches_pipeline() {
        let p = Fixed::new(Ok(vec![5000.0]));
        let q = FlightQuery {
            source_city: "Delhi".to_string(),
            destination_city: "Delhi".to_string(),
            ..query()
        };
        assert_eq!(
            invoke(&p, &q),
            Err(PredictError::InvalidQuery("same source and destination".to_string()))
        );
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_out_of_range_never_reaches_pipeline() {
        let p = Fixed::new(Ok(vec![5000.0]));
        let q = FlightQuery {
            dep_hour: 24,
            ..query()
        };
        match invoke(&p, &q) {
            Err(PredictError::InvalidQuery(msg)) => assert!(msg.contains("dep_hour=24")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pipeline_error_becomes_prediction_failed() {
        let p = Fixed::new(Err(PipelineError::MissingColumn("days_left".to_string())));
        match invoke(&p, &query()) {
            Err(PredictError::PredictionFailed(cause)) => assert!(cause.contains("days_left")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_output_length_fails() {
        let p = Fixed::new(Ok(vec![]));
        assert!(matches!(
            invoke(&p, &query()),
            Err(PredictError::PredictionFailed(_))
        ));
    }

    #[test]
    fn test_non_finite_fails() {
        let p = Fixed::new(Ok(vec![f64::NAN]));
        assert!(matches!(
            invoke(&p, &query()),
            Err(PredictError::PredictionFailed(_))
        ));
    }

    #[test]
    fn test_negative_clamped_to_zero() {
        let p = Fixed::new(Ok(vec![-12.5]));
        assert_eq!(invoke(&p, &query()), Ok(0.0));
    }
}
