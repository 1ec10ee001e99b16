//! Error types for the satvar library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading tracks or handling live locations.
#[derive(Error, Debug)]
pub enum SatvarError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The track source was not found.
    #[error("Track file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The XML of a GPX document could not be read.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A GPX element is missing data or carries an unparsable value.
    #[error("Invalid GPX: {reason}")]
    InvalidGpx { reason: String },

    /// Only sources with exactly one track are supported.
    #[error("currently only 1 track per file is supported: got {found}")]
    TrackCount { found: usize },

    /// A compressed track source could not be unpacked.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A live coordinate is not a number.
    #[error("Invalid {axis} value {value:?}: not a number")]
    InvalidCoordinate { axis: &'static str, value: String },

    /// A live coordinate is outside the valid WGS84 range.
    #[error("Coordinates out of range: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    CoordinateOutOfRange { lat: f64, lon: f64 },

    /// The elevation smoothing window must hold at least one sample.
    #[error("Invalid chunk size: {size} (must be at least 1)")]
    InvalidChunkSize { size: usize },

    /// A map was requested before any track was loaded.
    #[error("No track loaded")]
    TrackNotLoaded,

    /// Required configuration is missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using [`SatvarError`].
pub type Result<T> = std::result::Result<T, SatvarError>;

impl SatvarError {
    /// Returns true for errors caused by client-supplied live input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SatvarError::InvalidCoordinate { .. } | SatvarError::CoordinateOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SatvarError::TrackCount { found: 3 };
        assert!(err.to_string().contains("got 3"));

        let err = SatvarError::CoordinateOutOfRange {
            lat: 91.0,
            lon: 0.0,
        };
        assert!(err.to_string().contains("91"));

        let err = SatvarError::FileNotFound {
            path: PathBuf::from("Vilnius100km.gpx"),
        };
        assert!(err.to_string().contains("Vilnius100km.gpx"));

        let err = SatvarError::InvalidCoordinate {
            axis: "latitude",
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_client_errors() {
        assert!(SatvarError::InvalidCoordinate {
            axis: "longitude",
            value: String::new(),
        }
        .is_client_error());
        assert!(!SatvarError::TrackNotLoaded.is_client_error());
        assert!(!SatvarError::InvalidChunkSize { size: 0 }.is_client_error());
    }
}
