//! Trip metrics: haversine distance and smoothed elevation gain/loss.
//!
//! GPS receivers usually record about one sample per second, so raw elevation
//! readings are noisy. Elevation change is therefore measured between chunk
//! averages rather than between consecutive samples.

use serde::Serialize;

use crate::error::{Result, SatvarError};
use crate::track::TrackPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default elevation smoothing window (about one minute of 1 Hz samples).
pub const DEFAULT_CHUNK_SIZE: usize = 60;

/// Derived metrics of a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrackMetrics {
    /// Total distance along the track in kilometres.
    pub distance_km: f64,
    /// Accumulated elevation gain in meters.
    pub elevation_gain_m: f64,
    /// Accumulated elevation loss in meters (positive value).
    pub elevation_loss_m: f64,
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Total distance of an ordered point sequence in kilometres.
pub fn calculate_distance(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_km(&w[0], &w[1]))
        .fold(0.0, |acc, d| acc + d)
}

/// Calculate elevation gain and loss for a series of elevation samples.
///
/// `chunk_size` is the smoothing filter size: the samples go into a ring
/// buffer of that many slots (initially zero) and every `chunk_size`-th
/// sample, starting with the first, the buffer mean is compared with the
/// previous mean. The previous mean starts at 0.0, so the starting elevation
/// of the track is counted as gain (or loss when below sea level).
///
/// # Errors
///
/// Returns [`SatvarError::InvalidChunkSize`] if `chunk_size` is zero.
pub fn calculate_elevation(elevations: &[f64], chunk_size: usize) -> Result<(f64, f64)> {
    if chunk_size == 0 {
        return Err(SatvarError::InvalidChunkSize { size: chunk_size });
    }

    let mut window = vec![0.0; chunk_size];
    let mut previous = 0.0;
    let (mut gain, mut loss) = (0.0, 0.0);

    for (i, &elevation) in elevations.iter().enumerate() {
        window[i % chunk_size] = elevation;

        if i % chunk_size != 0 {
            continue;
        }

        let average = window.iter().sum::<f64>() / chunk_size as f64;
        let diff = average - previous;
        if diff > 0.0 {
            gain += diff;
        } else if diff < 0.0 {
            loss -= diff;
        }
        previous = average;
    }

    Ok((gain, loss))
}

/// Compute all metrics for a point sequence.
pub fn compute(points: &[TrackPoint], chunk_size: usize) -> Result<TrackMetrics> {
    let elevations: Vec<f64> = points.iter().map(|p| p.elevation).collect();
    let (elevation_gain_m, elevation_loss_m) = calculate_elevation(&elevations, chunk_size)?;

    Ok(TrackMetrics {
        distance_km: calculate_distance(points),
        elevation_gain_m,
        elevation_loss_m,
    })
}
