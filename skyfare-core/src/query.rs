//! Flight query record and its canonical feature layout

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::pipeline::{FeatureRecord, FeatureValue};

pub const STOPS_RANGE: RangeInclusive<u32> = 0..=4;
pub const DURATION_RANGE: RangeInclusive<u32> = 10..=2000;
pub const HOUR_RANGE: RangeInclusive<u32> = 0..=23;
pub const MINUTE_RANGE: RangeInclusive<u32> = 0..=59;
pub const DAYS_LEFT_RANGE: RangeInclusive<u32> = 0..=365;

/// Canonical column order of the record passed to the pipeline
pub const FEATURE_COLUMNS: [&str; 11] = [
    "airline",
    "source_city",
    "destination_city",
    "travel_class",
    "stops_num",
    "duration_mins",
    "dep_hour",
    "dep_min",
    "arr_hour",
    "arr_min",
    "days_left",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelClass {
    Economy,
    Business,
}

impl TravelClass {
    pub const ALL: [TravelClass; 2] = [TravelClass::Economy, TravelClass::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelClass::Economy => "economy",
            TravelClass::Business => "business",
        }
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prediction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightQuery {
    pub airline: String,
    pub source_city: String,
    pub destination_city: String,
    pub travel_class: TravelClass,
    pub stops_num: u32,
    pub duration_mins: u32,
    pub dep_hour: u32,
    pub dep_min: u32,
    pub arr_hour: u32,
    pub arr_min: u32,
    pub days_left: u32,
}

impl FlightQuery {
    /// Numeric fields outside their declared ranges, as (field, value) pairs
    pub fn out_of_range(&self) -> Vec<(&'static str, u32)> {
        let checks: [(&'static str, u32, &RangeInclusive<u32>); 7] = [
            ("stops_num", self.stops_num, &STOPS_RANGE),
            ("duration_mins", self.duration_mins, &DURATION_RANGE),
            ("dep_hour", self.dep_hour, &HOUR_RANGE),
            ("dep_min", self.dep_min, &MINUTE_RANGE),
            ("arr_hour", self.arr_hour, &HOUR_RANGE),
            ("arr_min", self.arr_min, &MINUTE_RANGE),
            ("days_left", self.days_left, &DAYS_LEFT_RANGE),
        ];

        checks
            .into_iter()
            .filter(|(_, value, range)| !range.contains(value))
            .map(|(name, value, _)| (name, value))
            .collect()
    }

    pub fn same_route(&self) -> bool {
        self.source_city == self.destination_city
    }

    /// Build the one-row record in [`FEATURE_COLUMNS`] order
    pub fn to_record(&self) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        record.push("airline", FeatureValue::Text(self.airline.clone()));
        record.push("source_city", FeatureValue::Text(self.source_city.clone()));
        record.push("destination_city", FeatureValue::Text(self.destination_city.clone()));
        record.push("travel_class", FeatureValue::Text(self.travel_class.as_str().to_string()));
        record.push("stops_num", FeatureValue::Integer(self.stops_num.into()));
        record.push("duration_mins", FeatureValue::Integer(self.duration_mins.into()));
        record.push("dep_hour", FeatureValue::Integer(self.dep_hour.into()));
        record.push("dep_min", FeatureValue::Integer(self.dep_min.into()));
        record.push("arr_hour", FeatureValue::Integer(self.arr_hour.into()));
        record.push("arr_min", FeatureValue::Integer(self.arr_min.into()));
        record.push("days_left", FeatureValue::Integer(self.days_left.into()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> FlightQuery {
        FlightQuery {
            airline: "IndiGo".to_string(),
            source_city: "Delhi".to_string(),
            destination_city: "Mumbai".to_string(),
            travel_class: TravelClass::Economy,
            stops_num: 0,
            duration_mins: 120,
            dep_hour: 10,
            dep_min: 0,
            arr_hour: 12,
            arr_min: 0,
            days_left: 20,
        }
    }

    #[test]
    fn test_record_uses_canonical_order() {
        let record = query().to_record();
        assert_eq!(record.names(), FEATURE_COLUMNS.to_vec());
        assert_eq!(
            record.get("travel_class"),
            Some(&FeatureValue::Text("economy".to_string()))
        );
        assert_eq!(record.get("days_left"), Some(&FeatureValue::Integer(20)));
    }

    #[test]
    fn test_in_range_query_has_no_violations() {
        assert!(query().out_of_range().is_empty());
    }

    #[test]
    fn test_out_of_range_fields_reported() {
        let q = FlightQuery {
            stops_num: 5,
            duration_mins: 9,
            arr_min: 60,
            days_left: 366,
            ..query()
        };
        assert_eq!(
            q.out_of_range(),
            vec![("stops_num", 5), ("duration_mins", 9), ("arr_min", 60), ("days_left", 366)]
        );
    }

    #[test]
    fn test_travel_class_serde_lowercase() {
        let q: FlightQuery = serde_json::from_str(
            r#"{"airline":"Vistara","source_city":"Delhi","destination_city":"Chennai",
                "travel_class":"business","stops_num":1,"duration_mins":180,
                "dep_hour":6,"dep_min":30,"arr_hour":9,"arr_min":30,"days_left":3}"#,
        )
        .unwrap();
        assert_eq!(q.travel_class, TravelClass::Business);
        assert!(serde_json::from_str::<TravelClass>(r#""first""#).is_err());
    }
}
