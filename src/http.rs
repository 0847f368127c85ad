//! HTTP API for mangrove membership checks.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pip::{Membership, MembershipChecker};

/// Application state shared across handlers
pub struct AppState {
    pub checker: MembershipChecker,
}

impl AppState {
    pub fn new(checker: MembershipChecker) -> Self {
        Self { checker }
    }
}

/// Build the router with all routes and layers
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/check", get(check_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct CheckQueryParams {
    /// Latitude in degrees
    lat: f64,
    /// Longitude in degrees
    lon: f64,
    /// Buffer radius in kilometers
    #[serde(default)]
    buffer_km: i64,
}

/// Membership check, e.g. `/check?lat=21.95&lon=88.75&buffer_km=5`
///
/// Responds with a bare `0` or `1`.
async fn check_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckQueryParams>,
) -> Json<Membership> {
    Json(
        state
            .checker
            .check(params.lat, params.lon, params.buffer_km),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    polygons: usize,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let polygons = state.checker.polygon_count();

    Json(HealthResponse {
        status: if polygons > 0 { "ok" } else { "degraded" },
        polygons,
    })
}
