//! Build information for the fare form footer
//!
//! Identifies which skyfare-web build is answering, so a fare can be traced
//! back to the binary (and its startup log banner) that produced it.

use axum::response::Json;
use serde::Serialize;

/// Shown in the page footer ahead of the version
pub const PRODUCT_NAME: &str = "SkyFare Predictor";

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub product: &'static str,
    pub module: &'static str,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        product: PRODUCT_NAME,
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}
