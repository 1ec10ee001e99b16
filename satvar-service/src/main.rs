//! Satvar Service - HTTP microservice for live route maps.
//!
//! Serves an SVG map of a recorded GPS track with each user's live position
//! and heading drawn on top.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SATVAR_TRACK_FILE` | GPX file to show | track.gpx |
//! | `SATVAR_RESOLUTION` | `coarse`, `fine` or `precise` | coarse |
//! | `SATVAR_CHUNK_SIZE` | Elevation smoothing window | 60 |
//! | `SATVAR_ROUTE_CAPACITY` | Locations kept per session | 100 |
//! | `SATVAR_MAX_SESSIONS` | Maximum live sessions | 10000 |
//! | `SATVAR_SESSION_IDLE_SECS` | Idle seconds before a session is evicted | 3600 |
//! | `SATVAR_FOLLOW_USER` | Center the map on the user | false |
//! | `SATVAR_DEMO` | Replay the track as the user's location | false |
//! | `SATVAR_PORT` | HTTP server port | 5000 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /map?session=S&lat=X&long=Y` - SVG map for a session
//! - `POST /location/{lat}/{long}?session=S` - Record a live location
//! - `GET /track` - Track summary
//! - `GET /health` - Health check
//! - `GET /stats` - Service statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use satvar::MapServiceBuilder;
use satvar_service::{handlers, router, AppState};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the satvar service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Satvar Route Map Service",
        version = "0.1.0",
        description = "REST API serving live route maps of a recorded GPS track.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_map,
        handlers::post_location,
        handlers::get_track,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::ErrorResponse,
            handlers::BoundsResponse,
            handlers::TrackResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "map", description = "Route map and live location endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satvar=info,satvar_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("SATVAR_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    // The library handles the SATVAR_* track, session and render settings
    let map_service = MapServiceBuilder::from_env()?.build();

    tracing::info!(
        track = %map_service.track_source().display(),
        resolution = ?map_service.resolution(),
        follow_user = map_service.render_options().follow_user,
        demo = map_service.is_demo(),
        port = port,
        "Starting satvar service"
    );

    // Requests retry the load, so a missing track is not fatal here
    if let Err(e) = map_service.load_track() {
        tracing::warn!(error = %e, "Track not loaded at startup");
    }

    let state = Arc::new(AppState { map_service });

    // Build router
    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
