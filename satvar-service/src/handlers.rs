//! HTTP request handlers for the route map service.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use satvar::{BoundingBox, SatvarError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Session used when a request does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Query parameters for the map endpoint.
///
/// Coordinates are taken as text and validated by the library, so a
/// malformed value is reported instead of silently dropped.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MapQuery {
    /// Opaque session identifier (default: "default").
    pub session: Option<String>,
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: Option<String>,
    /// Longitude in decimal degrees (-180 to 180).
    pub long: Option<String>,
}

/// Query parameters naming a session.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// Opaque session identifier (default: "default").
    pub session: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Geographic bounds of the track.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoundsResponse {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl From<BoundingBox> for BoundsResponse {
    fn from(b: BoundingBox) -> Self {
        Self {
            min_lat: b.min_lat,
            max_lat: b.max_lat,
            min_lon: b.min_lon,
            max_lon: b.max_lon,
        }
    }
}

/// Track summary response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    /// Track file the summary was computed from.
    pub source: String,
    /// Number of track points.
    pub points: usize,
    /// Total distance in kilometers.
    pub distance_km: f64,
    /// Smoothed elevation gain in meters.
    pub elevation_gain_m: f64,
    /// Smoothed elevation loss in meters.
    pub elevation_loss_m: f64,
    /// Bounds of the track, absent for an empty track.
    pub bounds: Option<BoundsResponse>,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Service statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of live sessions.
    pub active_sessions: u64,
    /// Whether a track is loaded.
    pub track_loaded: bool,
    /// Source of the loaded track.
    pub track_source: Option<String>,
    /// Number of points of the loaded track.
    pub track_points: usize,
}

/// Render the route map for a session.
///
/// When both `lat` and `long` are given they are recorded as the session's
/// new location first. In demo mode a request without coordinates moves the
/// session along the track instead.
///
/// # Returns
///
/// - `200 OK` with an SVG document
/// - `204 No Content` if there is nothing to draw
/// - `400 Bad Request` if the coordinates are invalid
/// - `500 Internal Server Error` if the track cannot be loaded
#[utoipa::path(
    get,
    path = "/map",
    params(MapQuery),
    responses(
        (status = 200, description = "Route map", content_type = "image/svg+xml", body = String),
        (status = 204, description = "Nothing to draw"),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Track could not be loaded", body = ErrorResponse)
    ),
    tag = "map"
)]
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Response {
    let session = query.session.as_deref().unwrap_or(DEFAULT_SESSION);
    let service = &state.map_service;

    match (query.lat.as_deref(), query.long.as_deref()) {
        (Some(lat), Some(long)) => {
            if let Err(e) = service.update_location(session, long, lat) {
                return error_response(session, e);
            }
        }
        (None, None) => {
            if service.is_demo() {
                if let Err(e) = service.replay_step(session) {
                    return error_response(session, e);
                }
            }
        }
        _ => {
            tracing::warn!(session, "Map query with only one coordinate");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Both lat and long are required".to_string(),
                }),
            )
                .into_response();
        }
    }

    match service.generate_map(session) {
        Ok(Some(drawing)) => {
            let svg = drawing.to_svg();
            tracing::debug!(session, bytes = svg.len(), "Map rendered");
            ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(session, e),
    }
}

/// Record a live location for a session.
///
/// # Returns
///
/// - `204 No Content` on success
/// - `400 Bad Request` if the coordinates are invalid
#[utoipa::path(
    post,
    path = "/location/{lat}/{long}",
    params(
        ("lat" = String, Path, description = "Latitude in decimal degrees"),
        ("long" = String, Path, description = "Longitude in decimal degrees"),
        SessionQuery
    ),
    responses(
        (status = 204, description = "Location recorded"),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse)
    ),
    tag = "map"
)]
pub async fn post_location(
    State(state): State<Arc<AppState>>,
    Path((lat, long)): Path<(String, String)>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let session = query.session.as_deref().unwrap_or(DEFAULT_SESSION);

    match state.map_service.update_location(session, &long, &lat) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(session, e),
    }
}

/// Get a summary of the track, loading it if needed.
#[utoipa::path(
    get,
    path = "/track",
    responses(
        (status = 200, description = "Track summary", body = TrackResponse),
        (status = 500, description = "Track could not be loaded", body = ErrorResponse)
    ),
    tag = "map"
)]
pub async fn get_track(State(state): State<Arc<AppState>>) -> Response {
    let service = &state.map_service;

    match service.load_track() {
        Ok(track) => {
            let metrics = track.metrics();
            let bounds = BoundingBox::from_points(track.points()).map(BoundsResponse::from);
            (
                StatusCode::OK,
                Json(TrackResponse {
                    source: service.track_source().display().to_string(),
                    points: track.len(),
                    distance_km: metrics.distance_km,
                    elevation_gain_m: metrics.elevation_gain_m,
                    elevation_loss_m: metrics.elevation_loss_m,
                    bounds,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(DEFAULT_SESSION, e),
    }
}

/// Create an error response for a failed request.
fn error_response(session: &str, e: SatvarError) -> Response {
    let status = if e.is_client_error() {
        tracing::warn!(session, error = %e, "Rejected request");
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(session, error = %e, "Request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get service statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Service statistics", body = StatsResponse)),
    tag = "system"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.map_service.stats();

    Json(StatsResponse {
        active_sessions: stats.active_sessions,
        track_loaded: stats.track_source.is_some(),
        track_source: stats.track_source.map(|p| p.display().to_string()),
        track_points: stats.track_points,
    })
}
