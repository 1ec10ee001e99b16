//! Live locations and heading estimation.
//!
//! A [`Route`] keeps the recent history of one moving user. The heading is
//! taken between the latest location and the one
//! [`LAST_N_POINTS_TO_COMPARE`] steps earlier, which rotates the map more
//! smoothly than comparing against the immediately preceding location.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::{Result, SatvarError};

/// How many locations back the heading is measured from.
///
/// Set to 1 to use the last location and the one right before it.
pub const LAST_N_POINTS_TO_COMPARE: usize = 2;

/// Default number of locations kept per route.
pub const DEFAULT_ROUTE_CAPACITY: usize = 100;

/// A live position reported by a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
}

impl Location {
    /// Create a location, validating the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SatvarError::CoordinateOutOfRange`] for non-finite values,
    /// latitudes beyond ±90° or longitudes beyond ±180°.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(SatvarError::CoordinateOutOfRange {
                lat: latitude,
                lon: longitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Parse a location from raw text, as received from a client.
    ///
    /// # Errors
    ///
    /// Returns [`SatvarError::InvalidCoordinate`] if either value is not a
    /// number, or [`SatvarError::CoordinateOutOfRange`] if it is outside the
    /// valid range.
    pub fn parse(longitude: &str, latitude: &str) -> Result<Self> {
        let longitude = parse_axis("longitude", longitude)?;
        let latitude = parse_axis("latitude", latitude)?;
        Self::new(longitude, latitude)
    }
}

fn parse_axis(axis: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SatvarError::InvalidCoordinate {
            axis,
            value: value.to_string(),
        })
}

/// Recent location history of a single user.
///
/// The history is a ring buffer: once full, adding a location evicts the
/// oldest one.
#[derive(Debug, Clone)]
pub struct Route {
    points: VecDeque<Location>,
    capacity: usize,
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

impl Route {
    /// Create a route holding up to [`DEFAULT_ROUTE_CAPACITY`] locations.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ROUTE_CAPACITY)
    }

    /// Create a route holding up to `capacity` locations.
    ///
    /// The capacity is raised to the minimum needed to compute a heading.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(LAST_N_POINTS_TO_COMPARE + 2);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a location. Repeated identical locations are kept.
    pub fn add_point(&mut self, location: Location) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(location);
    }

    /// Heading in degrees `[0, 360)` derived from recent history.
    ///
    /// Returns 0.0 until at least `LAST_N_POINTS_TO_COMPARE + 2` locations
    /// have been recorded.
    pub fn direction(&self) -> f64 {
        let len = self.points.len();
        if len < LAST_N_POINTS_TO_COMPARE + 2 {
            return 0.0;
        }

        let prev = self.points[len - LAST_N_POINTS_TO_COMPARE - 1];
        let current = self.points[len - 1];
        angle(
            prev.longitude,
            prev.latitude,
            current.longitude,
            current.latitude,
        )
    }

    /// The most recent location.
    pub fn last(&self) -> Option<&Location> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.points.iter()
    }
}

/// Coordinate types accepted by [`angle`].
pub trait AngleCoord: Copy {
    fn to_f64(self) -> f64;
}

impl AngleCoord for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl AngleCoord for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Angle in degrees `[0, 360)` of the vector from `(x1, y1)` to `(x2, y2)`.
///
/// The y delta is inverted because drawing surfaces grow y downward, so
/// 0° points east and 90° points up on screen.
pub fn angle<T: AngleCoord>(x1: T, y1: T, x2: T, y2: T) -> f64 {
    let delta_y = y1.to_f64() - y2.to_f64();
    let delta_x = x2.to_f64() - x1.to_f64();

    let degrees = delta_y.atan2(delta_x).to_degrees();
    if degrees < 0.0 {
        // A tiny negative angle rounds up to a full turn
        let wrapped = 360.0 + degrees;
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    } else {
        degrees
    }
}
