//! Satvar Service Library
//!
//! HTTP handlers and types for the route map service.
//! This library is used by both the satvar-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use satvar::MapService;

/// Application state shared across handlers.
pub struct AppState {
    /// Track, session and rendering service.
    pub map_service: MapService,
}

/// Build the API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/map", get(handlers::get_map))
        .route("/location/:lat/:long", post(handlers::post_location))
        .route("/track", get(handlers::get_track))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    BoundsResponse, ErrorResponse, HealthResponse, MapQuery, SessionQuery, StatsResponse,
    TrackResponse,
};
