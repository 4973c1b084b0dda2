//! # SkyFare Core Library
//!
//! Model resolution and input-schema derivation for the fare predictor:
//! - Artifact resolution over candidate files and serialization formats
//! - Categorical vocabulary introspection with a default fallback
//! - Flight query validation and prediction invocation
//! - Configuration loading for the binaries

pub mod artifact;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod predict;
pub mod query;
pub mod schema;
pub mod service;

pub use error::{Error, ModelUnavailable, PredictError, Result};
pub use query::{FlightQuery, TravelClass};
pub use service::FareService;
