//! Route map service.
//!
//! This module provides [`MapService`], a high-level interface tying the
//! pieces together: it loads the track once, keeps per-session live state,
//! and renders maps for a session on demand.
//!
//! ```ignore
//! use satvar::MapServiceBuilder;
//!
//! let service = MapServiceBuilder::new("Vilnius100km.gpx")
//!     .follow_user(true)
//!     .build();
//!
//! service.update_location("user-1", "25.2797", "54.6872")?;
//! if let Some(drawing) = service.generate_map("user-1")? {
//!     println!("{}", drawing.to_svg());
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SatvarError};
use crate::metrics::DEFAULT_CHUNK_SIZE;
use crate::projection::{project_track, Resolution};
use crate::render::{Drawing, MapRenderer, RenderOptions};
use crate::route::{Location, DEFAULT_ROUTE_CAPACITY};
use crate::session::{SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};
use crate::store::TrackStore;
use crate::track::Track;

/// Number of track points a demo session advances per map request.
pub const DEMO_REPLAY_STEP: usize = 5;

/// Track file used when `SATVAR_TRACK_FILE` is not set.
pub const DEFAULT_TRACK_FILE: &str = "track.gpx";

/// Statistics about the service.
#[derive(Debug, Clone, Default)]
pub struct ServiceStats {
    /// Number of live sessions.
    pub active_sessions: u64,
    /// Source of the loaded track, if any.
    pub track_source: Option<PathBuf>,
    /// Number of points of the loaded track.
    pub track_points: usize,
}

/// Track metrics, projection and map rendering for many concurrent users.
///
/// # Example
///
/// ```ignore
/// use satvar::MapService;
///
/// let service = MapService::new("Vilnius100km.gpx");
/// let track = service.load_track()?;
/// println!("{}", track);
///
/// service.update_location("user-1", "25.2797", "54.6872")?;
/// let svg = service.generate_map("user-1")?.map(|d| d.to_svg());
/// ```
pub struct MapService {
    /// Source of the track to show.
    track_source: PathBuf,
    tracks: TrackStore,
    sessions: SessionStore,
    renderer: MapRenderer,
    resolution: Resolution,
    /// Replay the track as the user's location when no location is given.
    demo: bool,
}

impl MapService {
    /// Create a service with default settings.
    pub fn new<P: AsRef<Path>>(track_source: P) -> Self {
        MapServiceBuilder::new(track_source).build()
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(track_source: P) -> MapServiceBuilder {
        MapServiceBuilder::new(track_source)
    }

    /// Load the configured track unless it is already loaded.
    pub fn load_track(&self) -> Result<Arc<Track>> {
        self.tracks.load(&self.track_source)
    }

    /// Check whether the configured track is loaded.
    pub fn track_loaded(&self) -> bool {
        self.tracks.is_loaded(&self.track_source)
    }

    /// The loaded track, if any.
    pub fn track(&self) -> Option<Arc<Track>> {
        self.tracks.track()
    }

    /// Record a location for a session.
    pub fn set_location(&self, session: &str, location: Location) {
        tracing::debug!(
            session,
            lon = location.longitude,
            lat = location.latitude,
            "Location update"
        );
        self.sessions.set_location(session, location);
    }

    /// Parse and record a location received as text.
    ///
    /// Invalid input is rejected without touching the session.
    pub fn update_location(&self, session: &str, longitude: &str, latitude: &str) -> Result<Location> {
        let location = Location::parse(longitude, latitude).inspect_err(|e| {
            tracing::warn!(session, longitude, latitude, error = %e, "Rejected location");
        })?;
        self.set_location(session, location);
        Ok(location)
    }

    /// Move a demo session along the track and record the new position.
    ///
    /// Each call advances [`DEMO_REPLAY_STEP`] points, wrapping back to the
    /// start at the end of the track. Returns `None` for an empty track.
    pub fn replay_step(&self, session: &str) -> Result<Option<Location>> {
        let track = self.load_track()?;
        let points = track.points();

        let location = self.sessions.with_session(session, |state| {
            let index = state.advance_replay(DEMO_REPLAY_STEP, points.len());
            let point = points.get(index)?;
            let location = Location {
                longitude: point.longitude,
                latitude: point.latitude,
            };
            state.set_location(location);
            Some(location)
        });

        tracing::debug!(session, ?location, "Demo replay step");
        Ok(location)
    }

    /// Current location of a session.
    pub fn location(&self, session: &str) -> Option<Location> {
        self.sessions.location(session)
    }

    /// Heading of a session in degrees.
    pub fn direction(&self, session: &str) -> f64 {
        self.sessions.direction(session)
    }

    /// Render the map for a session, loading the track first if needed.
    ///
    /// Returns `Ok(None)` when there is nothing to draw.
    pub fn generate_map(&self, session: &str) -> Result<Option<Drawing>> {
        let track = self.load_track()?;
        Ok(self.render(&track, session))
    }

    /// Render the map for a session using the already loaded track.
    ///
    /// # Errors
    ///
    /// Returns [`SatvarError::TrackNotLoaded`] if no track is loaded.
    pub fn render_loaded(&self, session: &str) -> Result<Option<Drawing>> {
        let track = self.tracks.require()?;
        Ok(self.render(&track, session))
    }

    fn render(&self, track: &Track, session: &str) -> Option<Drawing> {
        let (location, heading) = self.sessions.position(session);

        let projection = project_track(track.points(), location.as_ref(), self.resolution)?;
        let drawing = self.renderer.render(&projection, heading);
        if drawing.is_none() {
            tracing::debug!(session, "Nothing to draw");
        }
        drawing
    }

    /// Source of the configured track.
    pub fn track_source(&self) -> &Path {
        &self.track_source
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn render_options(&self) -> &RenderOptions {
        self.renderer.options()
    }

    /// Whether demo replay is enabled.
    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Returns service statistics.
    pub fn stats(&self) -> ServiceStats {
        let track = self.tracks.track();
        ServiceStats {
            active_sessions: self.sessions.stats().active_sessions,
            track_source: self.tracks.source(),
            track_points: track.map(|t| t.len()).unwrap_or(0),
        }
    }
}

/// Builder for configuring a [`MapService`].
///
/// # Example
///
/// ```ignore
/// use satvar::{MapServiceBuilder, Resolution};
///
/// let service = MapServiceBuilder::new("Vilnius100km.gpx")
///     .resolution(Resolution::Fine)
///     .chunk_size(30)
///     .follow_user(true)
///     .build();
/// ```
pub struct MapServiceBuilder {
    track_source: PathBuf,
    resolution: Resolution,
    chunk_size: usize,
    route_capacity: usize,
    max_sessions: u64,
    session_idle: Duration,
    render: RenderOptions,
    demo: bool,
}

impl MapServiceBuilder {
    /// Create a new builder for the given track source.
    pub fn new<P: AsRef<Path>>(track_source: P) -> Self {
        Self {
            track_source: track_source.as_ref().to_path_buf(),
            resolution: Resolution::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            route_capacity: DEFAULT_ROUTE_CAPACITY,
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: DEFAULT_SESSION_IDLE,
            render: RenderOptions::default(),
            demo: false,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SATVAR_TRACK_FILE` | GPX file to show | track.gpx |
    /// | `SATVAR_RESOLUTION` | `coarse`, `fine` or `precise` | coarse |
    /// | `SATVAR_CHUNK_SIZE` | Elevation smoothing window | 60 |
    /// | `SATVAR_ROUTE_CAPACITY` | Locations kept per session | 100 |
    /// | `SATVAR_MAX_SESSIONS` | Maximum live sessions | 10000 |
    /// | `SATVAR_SESSION_IDLE_SECS` | Idle seconds before a session is evicted | 3600 |
    /// | `SATVAR_FOLLOW_USER` | Center the map on the user | false |
    /// | `SATVAR_DEMO` | Replay the track as the user's location | false |
    ///
    /// # Errors
    ///
    /// Returns [`SatvarError::Config`] if `SATVAR_RESOLUTION` is not a known
    /// resolution or `SATVAR_CHUNK_SIZE` is zero.
    pub fn from_env() -> Result<Self> {
        let track_source =
            std::env::var("SATVAR_TRACK_FILE").unwrap_or_else(|_| DEFAULT_TRACK_FILE.to_string());

        let mut builder = Self::new(track_source);

        if let Ok(value) = std::env::var("SATVAR_RESOLUTION") {
            builder.resolution = value
                .parse()
                .map_err(|e| SatvarError::Config(format!("SATVAR_RESOLUTION: {e}")))?;
        }
        if let Some(size) = env_parse("SATVAR_CHUNK_SIZE") {
            if size == 0 {
                return Err(SatvarError::Config(
                    "SATVAR_CHUNK_SIZE must be at least 1".to_string(),
                ));
            }
            builder.chunk_size = size;
        }
        if let Some(capacity) = env_parse("SATVAR_ROUTE_CAPACITY") {
            builder.route_capacity = capacity;
        }
        if let Some(max) = env_parse("SATVAR_MAX_SESSIONS") {
            builder.max_sessions = max;
        }
        if let Some(secs) = env_parse("SATVAR_SESSION_IDLE_SECS") {
            builder.session_idle = Duration::from_secs(secs);
        }
        builder.render.follow_user = env_flag("SATVAR_FOLLOW_USER");
        builder.demo = env_flag("SATVAR_DEMO");

        Ok(builder)
    }

    /// Set the track source.
    ///
    /// Overrides the source set in the constructor or from environment.
    pub fn track_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.track_source = path.as_ref().to_path_buf();
        self
    }

    /// Set the projection resolution.
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the elevation smoothing window.
    ///
    /// Default is 60 samples. A zero window makes every load fail.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the number of locations kept per session.
    pub fn route_capacity(mut self, capacity: usize) -> Self {
        self.route_capacity = capacity;
        self
    }

    /// Set the maximum number of live sessions.
    pub fn max_sessions(mut self, max: u64) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the idle period after which sessions are evicted.
    pub fn session_idle(mut self, idle: Duration) -> Self {
        self.session_idle = idle;
        self
    }

    /// Center the map on the user's location.
    pub fn follow_user(mut self, follow: bool) -> Self {
        self.render.follow_user = follow;
        self
    }

    /// Replace all render options.
    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Replay the track as the user's location.
    pub fn demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Build the [`MapService`].
    pub fn build(self) -> MapService {
        MapService {
            track_source: self.track_source,
            tracks: TrackStore::new(self.chunk_size),
            sessions: SessionStore::new(self.route_capacity, self.max_sessions, self.session_idle),
            renderer: MapRenderer::new(self.render),
            resolution: self.resolution,
            demo: self.demo,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
