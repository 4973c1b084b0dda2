//! HTTP API handlers for skyfare-web

pub mod buildinfo;
pub mod health;
pub mod model;
pub mod predict;
pub mod ui;
pub mod vocabulary;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use model::get_model_info;
pub use predict::predict_fare;
pub use ui::{serve_app_js, serve_index};
pub use vocabulary::get_vocabulary;
