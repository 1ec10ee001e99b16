//! Track points and track loading.
//!
//! This module provides the [`Track`] struct: an immutable, ordered sequence
//! of [`TrackPoint`]s together with the metrics derived from them.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use memmap2::Mmap;
use serde::Serialize;

use crate::error::{Result, SatvarError};
use crate::gpx;
use crate::metrics::{self, TrackMetrics};

/// A single recorded position of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in meters.
    pub elevation: f64,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }
}

/// A loaded track with its derived metrics.
///
/// A track is never mutated once built. Share it between readers with
/// `Arc<Track>`.
///
/// # Example
///
/// ```ignore
/// use satvar::Track;
///
/// let track = Track::from_file("Vilnius100km.gpx", 60)?;
/// println!("{}", track); // 100.23 (#Points - 18234) Gain: 612m Loss: 598m
/// ```
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<TrackPoint>,
    metrics: TrackMetrics,
}

impl Track {
    /// Build a track from an ordered point sequence.
    ///
    /// # Arguments
    ///
    /// * `points` - Points in recording order
    /// * `chunk_size` - Elevation smoothing window, see [`metrics::calculate_elevation`]
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero.
    pub fn from_points(points: Vec<TrackPoint>, chunk_size: usize) -> Result<Self> {
        let metrics = metrics::compute(&points, chunk_size)?;
        Ok(Self { points, metrics })
    }

    /// Load a track from a GPX file.
    ///
    /// The source may be a plain `.gpx` file (memory-mapped), a gzip
    /// compressed `.gz` file, or, when `path` itself does not exist, a
    /// sibling `<path>.zip` archive containing the GPX document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither the file nor a `.zip` archive next to it exists
    /// - The document is not valid GPX
    /// - The document contains anything other than exactly one track
    pub fn from_file<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();

        let points = if path.exists() {
            if path.extension().is_some_and(|ext| ext == "gz") {
                let mut xml = Vec::new();
                GzDecoder::new(File::open(path)?).read_to_end(&mut xml)?;
                gpx::parse_track(&xml)?
            } else {
                let file = File::open(path)?;

                // SAFETY: The mapping is read-only and dropped before this
                // function returns; the file must not be truncated meanwhile.
                let mmap = unsafe { Mmap::map(&file)? };
                gpx::parse_track(&mmap)?
            }
        } else {
            let zip_path = zip_sibling(path);
            if !zip_path.exists() {
                return Err(SatvarError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let xml = extract_gpx_from_zip(&zip_path)?;
            gpx::parse_track(&xml)?
        };

        let track = Self::from_points(points, chunk_size)?;
        tracing::debug!(path = %path.display(), track = %track, "Track loaded");
        Ok(track)
    }

    /// Returns the points in recording order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Returns the derived metrics.
    pub fn metrics(&self) -> TrackMetrics {
        self.metrics
    }

    /// Total distance in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.metrics.distance_km
    }

    /// Accumulated elevation gain in meters.
    pub fn elevation_gain_m(&self) -> f64 {
        self.metrics.elevation_gain_m
    }

    /// Accumulated elevation loss in meters.
    pub fn elevation_loss_m(&self) -> f64 {
        self.metrics.elevation_loss_m
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} (#Points - {}) Gain: {:.0}m Loss: {:.0}m",
            self.metrics.distance_km,
            self.points.len(),
            self.metrics.elevation_gain_m,
            self.metrics.elevation_loss_m,
        )
    }
}

fn zip_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Read the first `.gpx` entry of a zip archive.
fn extract_gpx_from_zip(zip_path: &Path) -> Result<Vec<u8>> {
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().to_ascii_lowercase().ends_with(".gpx") {
            let mut xml = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut xml)?;
            return Ok(xml);
        }
    }

    Err(SatvarError::InvalidGpx {
        reason: format!("no .gpx entry in {}", zip_path.display()),
    })
}
