//! Projection of geographic coordinates onto a pixel canvas.
//!
//! The canvas covers the bounding box of a track. Its size follows from the
//! extent of the box in degrees multiplied by a [`Resolution`] factor, and
//! every coordinate is normalized into the box before being scaled onto it.
//!
//! Pixel `y` grows northward here; renderers working on a y-down surface
//! flip it with `height - y`.

use std::str::FromStr;

use serde::Serialize;

use crate::route::Location;
use crate::track::TrackPoint;

/// Pixel density of the projection.
///
/// See <https://en.wikipedia.org/wiki/Decimal_degrees> for the accuracy of
/// each decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// 10,000 pixels per degree, ~11.1 m per pixel (best for testing)
    #[default]
    Coarse,
    /// 100,000 pixels per degree, ~1.1 m per pixel
    Fine,
    /// 1,000,000 pixels per degree, ~1.1 cm per pixel
    Precise,
}

impl Resolution {
    /// Returns the number of pixels per degree.
    pub fn pixels_per_degree(&self) -> f64 {
        match self {
            Resolution::Coarse => 10_000.0,
            Resolution::Fine => 100_000.0,
            Resolution::Precise => 1_000_000.0,
        }
    }

    /// Returns the approximate size of one pixel in meters at the equator.
    pub fn meters_per_pixel(&self) -> f64 {
        match self {
            Resolution::Coarse => 11.1,
            Resolution::Fine => 1.1,
            Resolution::Precise => 0.011,
        }
    }

    /// Scale an extent in degrees to whole pixels.
    pub fn to_pixels(&self, degrees: f64) -> i32 {
        (self.pixels_per_degree() * degrees).round() as i32
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coarse" | "10000" | "10_000" => Ok(Resolution::Coarse),
            "fine" | "100000" | "100_000" => Ok(Resolution::Fine),
            "precise" | "1000000" | "1_000_000" => Ok(Resolution::Precise),
            other => Err(format!(
                "unknown resolution {other:?} (expected coarse, fine or precise)"
            )),
        }
    }
}

/// The minimal axis-aligned box containing all points of a track.
///
/// Coordinates are in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Compute the bounding box of a point sequence.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };

        Some(points.iter().skip(1).fold(init, |b, p| Self {
            min_lat: b.min_lat.min(p.latitude),
            max_lat: b.max_lat.max(p.latitude),
            min_lon: b.min_lon.min(p.longitude),
            max_lon: b.max_lon.max(p.longitude),
        }))
    }

    /// Check whether a coordinate lies inside the box (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Extent in degrees of longitude.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Extent in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// A coordinate mapped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedPoint {
    /// Pixel column, growing eastward.
    pub x: i32,
    /// Pixel row, growing northward.
    pub y: i32,
    /// Index of the source point in the track, `None` for synthetic points
    /// such as the user marker.
    pub source_index: Option<usize>,
}

/// Maps coordinates inside a bounding box to pixels.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    bounds: BoundingBox,
    width: i32,
    height: i32,
}

impl Projector {
    pub fn new(bounds: BoundingBox, resolution: Resolution) -> Self {
        Self {
            bounds,
            width: resolution.to_pixels(bounds.lon_span()),
            height: resolution.to_pixels(bounds.lat_span()),
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Project a coordinate onto the canvas.
    ///
    /// Coordinates outside the bounding box land outside the canvas; they
    /// are not clamped.
    pub fn project(&self, lat: f64, lon: f64, source_index: Option<usize>) -> ProjectedPoint {
        ProjectedPoint {
            x: scale(lon, self.bounds.min_lon, self.bounds.max_lon, self.width),
            y: scale(lat, self.bounds.min_lat, self.bounds.max_lat, self.height),
            source_index,
        }
    }

    /// Project a live location, producing a synthetic point.
    pub fn project_location(&self, location: &Location) -> ProjectedPoint {
        self.project(location.latitude, location.longitude, None)
    }
}

/// A projected track plus an optional user position on the same canvas.
#[derive(Debug, Clone)]
pub struct Projection {
    pub points: Vec<ProjectedPoint>,
    pub user: Option<ProjectedPoint>,
    pub bounds: BoundingBox,
    pub width: i32,
    pub height: i32,
}

/// Project a whole track and an optional user location.
///
/// Returns `None` for an empty track, which has no bounding box.
pub fn project_track(
    points: &[TrackPoint],
    user: Option<&Location>,
    resolution: Resolution,
) -> Option<Projection> {
    let bounds = BoundingBox::from_points(points)?;
    let projector = Projector::new(bounds, resolution);

    let projected = points
        .iter()
        .enumerate()
        .map(|(i, p)| projector.project(p.latitude, p.longitude, Some(i)))
        .collect();

    Some(Projection {
        points: projected,
        user: user.map(|loc| projector.project_location(loc)),
        bounds,
        width: projector.width(),
        height: projector.height(),
    })
}

fn scale(value: f64, min: f64, max: f64, size: i32) -> i32 {
    (normalize(value, min, max) * size as f64).round() as i32
}

/// Normalize `value` into `[0, 1]` relative to `[min, max]`.
///
/// An empty range normalizes to 0.0.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return 0.0;
    }
    (value - min) / range
}
