//! Categorical vocabulary derivation
//!
//! Reads the fitted category lists back out of the pipeline's encoder so the
//! form only offers values the model was trained on. Each field is derived on
//! its own: a missing or empty airline or source list is replaced by the
//! built-in defaults, and a missing destination list reuses the source cities.
//! When the pipeline exposes no encoder at all, the whole default vocabulary
//! is substituted.

use serde::Serialize;
use tracing::{info, warn};

use crate::pipeline::{CategoryValue, IntrospectionError, PredictionPipeline};

/// Encoder column order: airline, source_city, destination_city
const AIRLINE_INDEX: usize = 0;
const SOURCE_INDEX: usize = 1;
const DESTINATION_INDEX: usize = 2;

const DEFAULT_AIRLINES: &[&str] = &["IndiGo", "Air India", "Vistara", "SpiceJet", "GO FIRST"];
const DEFAULT_CITIES: &[&str] = &[
    "Delhi",
    "Mumbai",
    "Bengaluru",
    "Kolkata",
    "Hyderabad",
    "Chennai",
];

/// Valid values for the categorical fields, each sorted and deduplicated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalVocabulary {
    pub airlines: Vec<String>,
    pub source_cities: Vec<String>,
    pub destination_cities: Vec<String>,
}

impl CategoricalVocabulary {
    pub fn new(
        airlines: Vec<String>,
        source_cities: Vec<String>,
        destination_cities: Vec<String>,
    ) -> Self {
        Self {
            airlines: normalize(airlines),
            source_cities: normalize(source_cities),
            destination_cities: normalize(destination_cities),
        }
    }

    /// Built-in vocabulary covering the common airlines and metro cities
    pub fn fallback() -> Self {
        let cities = default_cities();
        Self::new(default_airlines(), cities.clone(), cities)
    }

    pub fn has_airline(&self, airline: &str) -> bool {
        self.airlines.binary_search_by(|a| a.as_str().cmp(airline)).is_ok()
    }

    pub fn has_source(&self, city: &str) -> bool {
        self.source_cities.binary_search_by(|c| c.as_str().cmp(city)).is_ok()
    }

    pub fn has_destination(&self, city: &str) -> bool {
        self.destination_cities
            .binary_search_by(|c| c.as_str().cmp(city))
            .is_ok()
    }
}

fn normalize(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

fn default_airlines() -> Vec<String> {
    DEFAULT_AIRLINES.iter().map(|s| s.to_string()).collect()
}

fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|s| s.to_string()).collect()
}

/// Which branch produced the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularySource {
    /// Every field read from the fitted encoder
    Derived(CategoricalVocabulary),
    /// Some fields read from the encoder; `substituted` names the others
    Partial {
        vocabulary: CategoricalVocabulary,
        substituted: Vec<&'static str>,
        reason: String,
    },
    /// Built-in default; `reason` says why introspection did not succeed
    Fallback {
        vocabulary: CategoricalVocabulary,
        reason: String,
    },
}

impl VocabularySource {
    pub fn vocabulary(&self) -> &CategoricalVocabulary {
        match self {
            VocabularySource::Derived(v) => v,
            VocabularySource::Partial { vocabulary, .. } => vocabulary,
            VocabularySource::Fallback { vocabulary, .. } => vocabulary,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, VocabularySource::Fallback { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, VocabularySource::Partial { .. })
    }

    /// Short label for API responses: "derived", "partial" or "fallback"
    pub fn kind(&self) -> &'static str {
        match self {
            VocabularySource::Derived(_) => "derived",
            VocabularySource::Partial { .. } => "partial",
            VocabularySource::Fallback { .. } => "fallback",
        }
    }

    /// Fields that were not read from the encoder
    pub fn substituted_fields(&self) -> &[&'static str] {
        match self {
            VocabularySource::Derived(_) => &[],
            VocabularySource::Partial { substituted, .. } => substituted,
            VocabularySource::Fallback { .. } => &FIELDS,
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            VocabularySource::Derived(_) => None,
            VocabularySource::Partial { reason, .. } => Some(reason),
            VocabularySource::Fallback { reason, .. } => Some(reason),
        }
    }
}

const FIELDS: [&str; 3] = ["airline", "source_city", "destination_city"];

/// Derive the vocabulary from a loaded pipeline, falling back silently
pub fn introspect(pipeline: &dyn PredictionPipeline) -> VocabularySource {
    let categories = match pipeline.encoder_categories() {
        Ok(categories) => categories,
        Err(e) => {
            warn!("Vocabulary introspection failed, using defaults: {}", e);
            return VocabularySource::Fallback {
                vocabulary: CategoricalVocabulary::fallback(),
                reason: e.to_string(),
            };
        }
    };

    let mut gaps: Vec<(&'static str, IntrospectionError)> = Vec::new();

    let airlines = match category_list(&categories, AIRLINE_INDEX, FIELDS[0]) {
        Ok(values) => values,
        Err(e) => {
            gaps.push((FIELDS[0], e));
            default_airlines()
        }
    };
    let source_cities = match category_list(&categories, SOURCE_INDEX, FIELDS[1]) {
        Ok(values) => values,
        Err(e) => {
            gaps.push((FIELDS[1], e));
            default_cities()
        }
    };
    let destination_cities = match category_list(&categories, DESTINATION_INDEX, FIELDS[2]) {
        Ok(values) => values,
        Err(e) => {
            gaps.push((FIELDS[2], e));
            source_cities.clone()
        }
    };

    let vocabulary = CategoricalVocabulary::new(airlines, source_cities, destination_cities);

    if gaps.is_empty() {
        info!(
            "Vocabulary derived: {} airlines, {} source cities, {} destination cities",
            vocabulary.airlines.len(),
            vocabulary.source_cities.len(),
            vocabulary.destination_cities.len()
        );
        return VocabularySource::Derived(vocabulary);
    }

    let reason = gaps
        .iter()
        .map(|(_, e)| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    if gaps.len() == FIELDS.len() {
        warn!("Vocabulary introspection failed, using defaults: {}", reason);
        return VocabularySource::Fallback { vocabulary, reason };
    }

    let substituted: Vec<&'static str> = gaps.iter().map(|(field, _)| *field).collect();
    warn!(
        "Vocabulary partly derived, substituted {}: {}",
        substituted.join(", "),
        reason
    );
    VocabularySource::Partial {
        vocabulary,
        substituted,
        reason,
    }
}

fn category_list(
    categories: &[Vec<CategoryValue>],
    index: usize,
    field: &str,
) -> Result<Vec<String>, IntrospectionError> {
    let list = categories.get(index).ok_or_else(|| {
        IntrospectionError::UnexpectedStructure(format!(
            "encoder has {} category lists, no entry for {}",
            categories.len(),
            field
        ))
    })?;

    let values: Vec<String> = list.iter().filter_map(CategoryValue::display).collect();
    if values.is_empty() {
        return Err(IntrospectionError::UnexpectedStructure(format!(
            "no usable categories for {}",
            field
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FeatureRecord, PipelineError};

    struct FixedCategories(Vec<Vec<CategoryValue>>);

    impl PredictionPipeline for FixedCategories {
        fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError> {
            Ok(vec![0.0; batch.len()])
        }

        fn encoder_categories(&self) -> Result<Vec<Vec<CategoryValue>>, IntrospectionError> {
            Ok(self.0.clone())
        }
    }

    struct Opaque;

    impl PredictionPipeline for Opaque {
        fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError> {
            Ok(vec![0.0; batch.len()])
        }
    }

    fn texts(values: &[&str]) -> Vec<CategoryValue> {
        values.iter().map(|s| CategoryValue::Text(s.to_string())).collect()
    }

    #[test]
    fn test_derived_lists_are_sorted() {
        let p = FixedCategories(vec![
            texts(&["IndiGo", "Air India"]),
            texts(&["Delhi", "Mumbai"]),
            texts(&["Mumbai", "Delhi"]),
        ]);

        match introspect(&p) {
            VocabularySource::Derived(v) => {
                assert_eq!(v.airlines, vec!["Air India", "IndiGo"]);
                assert_eq!(v.source_cities, vec!["Delhi", "Mumbai"]);
                assert_eq!(v.destination_cities, vec!["Delhi", "Mumbai"]);
            }
            other => panic!("expected derived vocabulary, got {:?}", other),
        }
    }

    #[test]
    fn test_nulls_dropped_and_values_stringified() {
        let p = FixedCategories(vec![
            vec![
                CategoryValue::Text("Vistara".to_string()),
                CategoryValue::Null,
                CategoryValue::Integer(42),
            ],
            vec![CategoryValue::Text("Delhi".to_string()), CategoryValue::Float(f64::NAN)],
            texts(&["Chennai", "Chennai"]),
        ]);

        let source = introspect(&p);
        assert!(!source.is_fallback());
        let v = source.vocabulary();
        assert_eq!(v.airlines, vec!["42", "Vistara"]);
        assert_eq!(v.source_cities, vec!["Delhi"]);
        assert_eq!(v.destination_cities, vec!["Chennai"]);
    }

    #[test]
    fn test_opaque_pipeline_falls_back() {
        let source = introspect(&Opaque);
        assert!(source.is_fallback());
        assert_eq!(source.vocabulary(), &CategoricalVocabulary::fallback());
        assert!(source.fallback_reason().is_some());
    }

    #[test]
    fn test_missing_destination_list_reuses_derived_sources() {
        let p = FixedCategories(vec![texts(&["Akasa Air"]), texts(&["Pune", "Goa"])]);

        match introspect(&p) {
            VocabularySource::Partial {
                vocabulary,
                substituted,
                reason,
            } => {
                assert_eq!(vocabulary.airlines, vec!["Akasa Air"]);
                assert_eq!(vocabulary.source_cities, vec!["Goa", "Pune"]);
                assert_eq!(vocabulary.destination_cities, vec!["Goa", "Pune"]);
                assert_eq!(substituted, vec!["destination_city"]);
                assert!(reason.contains("destination_city"));
            }
            other => panic!("expected partial vocabulary, got {:?}", other),
        }
    }

    #[test]
    fn test_all_null_airline_list_uses_default_airlines_only() {
        let p = FixedCategories(vec![
            vec![CategoryValue::Null],
            texts(&["Delhi"]),
            texts(&["Mumbai"]),
        ]);

        let source = introspect(&p);
        assert!(source.is_partial());
        assert!(!source.is_fallback());
        assert_eq!(source.kind(), "partial");
        assert_eq!(source.substituted_fields(), &["airline"]);

        let v = source.vocabulary();
        assert_eq!(
            v.airlines,
            vec!["Air India", "GO FIRST", "IndiGo", "SpiceJet", "Vistara"]
        );
        assert_eq!(v.source_cities, vec!["Delhi"]);
        assert_eq!(v.destination_cities, vec!["Mumbai"]);
    }

    #[test]
    fn test_missing_source_list_feeds_defaults_to_destination() {
        let p = FixedCategories(vec![texts(&["IndiGo"]), vec![CategoryValue::Null]]);

        let source = introspect(&p);
        assert_eq!(source.substituted_fields(), &["source_city", "destination_city"]);
        let v = source.vocabulary();
        assert_eq!(v.airlines, vec!["IndiGo"]);
        assert_eq!(v.source_cities, CategoricalVocabulary::fallback().source_cities);
        assert_eq!(v.destination_cities, v.source_cities);
    }

    #[test]
    fn test_no_usable_lists_falls_back_entirely() {
        let source = introspect(&FixedCategories(Vec::new()));
        assert!(source.is_fallback());
        assert_eq!(source.kind(), "fallback");
        assert_eq!(source.vocabulary(), &CategoricalVocabulary::fallback());
        assert!(source.fallback_reason().unwrap().contains("airline"));
    }

    #[test]
    fn test_fallback_vocabulary_contents() {
        let v = CategoricalVocabulary::fallback();
        assert_eq!(
            v.airlines,
            vec!["Air India", "GO FIRST", "IndiGo", "SpiceJet", "Vistara"]
        );
        assert_eq!(v.source_cities, v.destination_cities);
        assert!(v.has_source("Hyderabad"));
        assert!(v.has_airline("IndiGo"));
        assert!(!v.has_destination("Goa"));
    }
}
