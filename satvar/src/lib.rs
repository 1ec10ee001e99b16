//! # Satvar - GPS Track Maps
//!
//! Library for turning a recorded GPS track into a live route map: track
//! metrics, projection onto a pixel canvas, heading estimation from live
//! locations and vector map rendering.
//!
//! ## Features
//!
//! - **Metrics**: Haversine distance and chunk-smoothed elevation gain/loss
//! - **Projection**: Bounding box to pixel canvas at a chosen resolution
//! - **Live Routes**: Bounded per-session location history and heading
//! - **Rendering**: SVG maps with start/finish markers, direction arrows and
//!   an optional follow-user viewport rotated with the heading
//!
//! ## Quick Start
//!
//! ```ignore
//! use satvar::{project_track, MapRenderer, Resolution, Track};
//!
//! let track = Track::from_file("Vilnius100km.gpx", 60)?;
//! println!("{}", track);
//!
//! if let Some(projection) = project_track(track.points(), None, Resolution::Coarse) {
//!     let drawing = MapRenderer::default().render(&projection, 0.0);
//!     if let Some(drawing) = drawing {
//!         std::fs::write("map.svg", drawing.to_svg())?;
//!     }
//! }
//! ```
//!
//! ## Track Sources
//!
//! Tracks are read from GPX 1.1 files holding exactly one `<trk>`. All its
//! segments are joined into one point sequence. Plain files are memory
//! mapped; `.gpx.gz` files are gunzipped, and a missing `track.gpx` is looked
//! up inside `track.gpx.zip`.

pub mod error;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod gpx;
pub mod metrics;
pub mod projection;
pub mod render;
pub mod route;
pub mod service;
pub mod session;
pub mod store;
pub mod track;

// Re-export main types at crate root for convenience
pub use error::{Result, SatvarError};
pub use metrics::{TrackMetrics, DEFAULT_CHUNK_SIZE};
pub use projection::{project_track, BoundingBox, ProjectedPoint, Projection, Projector, Resolution};
pub use render::{Drawing, MapRenderer, Marker, Primitive, RenderOptions, ViewBox};
pub use route::{angle, Location, Route};
pub use service::{MapService, MapServiceBuilder, ServiceStats};
pub use session::{SessionState, SessionStore};
pub use store::TrackStore;
pub use track::{Track, TrackPoint};
