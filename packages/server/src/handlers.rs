//! HTTP handler functions for the dispatch map API.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/geojson`
///
/// Returns the current incident buffer as a `GeoJSON` `FeatureCollection`,
/// newest first. Never fails: an empty buffer yields an empty feature list.
pub async fn geojson(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.store.snapshot();
    HttpResponse::Ok().json(dispatch_map_geo::feature_collection(&snapshot))
}
