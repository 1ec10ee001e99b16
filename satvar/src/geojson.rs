//! GeoJSON export.
//!
//! This module converts a [`Track`] into a GeoJSON `LineString` feature.
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use satvar::Track;
//! use satvar::geojson::track_to_feature;
//!
//! let track = Track::from_file("Vilnius100km.gpx", 60)?;
//! let feature = track_to_feature(&track);
//! println!("{}", feature.to_string());
//! // {"type":"Feature","bbox":[...],"geometry":{"type":"LineString",...},"properties":{...}}
//! ```

use geojson::{Feature, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::Value as JsonValue;

use crate::projection::BoundingBox;
use crate::track::{Track, TrackPoint};

/// Convert track points to a GeoJSON `LineString` geometry.
///
/// Coordinates are in GeoJSON order with the elevation as the third
/// element: `[longitude, latitude, elevation]`.
pub fn points_to_geometry(points: &[TrackPoint]) -> Geometry {
    let coords = points
        .iter()
        .map(|p| vec![p.longitude, p.latitude, p.elevation])
        .collect();
    Geometry::new(GeoJsonValue::LineString(coords))
}

/// Convert a track to a GeoJSON feature.
///
/// The geometry is a `LineString` (see [`points_to_geometry`]). The
/// properties carry the point count and the track metrics:
///
/// ```json
/// {"points": 3, "distance_km": 1.2, "elevation_gain_m": 10.0, "elevation_loss_m": 4.0}
/// ```
///
/// The bounding box is set for non-empty tracks, as
/// `[min_lon, min_lat, max_lon, max_lat]`.
pub fn track_to_feature(track: &Track) -> Feature {
    let metrics = track.metrics();

    let mut properties = JsonObject::new();
    properties.insert("points".to_string(), JsonValue::from(track.len()));
    properties.insert("distance_km".to_string(), JsonValue::from(metrics.distance_km));
    properties.insert(
        "elevation_gain_m".to_string(),
        JsonValue::from(metrics.elevation_gain_m),
    );
    properties.insert(
        "elevation_loss_m".to_string(),
        JsonValue::from(metrics.elevation_loss_m),
    );

    let bbox = BoundingBox::from_points(track.points())
        .map(|b| vec![b.min_lon, b.min_lat, b.max_lon, b.max_lat]);

    Feature {
        bbox,
        geometry: Some(points_to_geometry(track.points())),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Track {
        Track::from_points(
            vec![
                TrackPoint::new(54.68, 25.27, 110.0),
                TrackPoint::new(54.69, 25.28, 120.0),
                TrackPoint::new(54.70, 25.26, 115.0),
            ],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_points_to_geometry() {
        let geometry = points_to_geometry(sample_track().points());

        if let GeoJsonValue::LineString(coords) = geometry.value {
            assert_eq!(coords.len(), 3);
            assert_eq!(coords[0], vec![25.27, 54.68, 110.0]); // lon, lat, ele
            assert_eq!(coords[2], vec![25.26, 54.70, 115.0]);
        } else {
            panic!("Expected LineString geometry");
        }
    }

    #[test]
    fn test_track_to_feature_properties() {
        let track = sample_track();
        let feature = track_to_feature(&track);

        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["points"], 3);
        assert_eq!(properties["elevation_gain_m"], track.elevation_gain_m());
        assert_eq!(properties["elevation_loss_m"], 5.0);
        assert!(properties["distance_km"].as_f64().unwrap() > 2.0);

        assert_eq!(feature.bbox, Some(vec![25.26, 54.68, 25.28, 54.70]));
    }

    #[test]
    fn test_feature_serializes() {
        let json = track_to_feature(&sample_track()).to_string();
        assert!(json.contains(r#""type":"Feature""#));
        assert!(json.contains(r#""type":"LineString""#));
        assert!(json.contains("elevation_gain_m"));
    }

    #[test]
    fn test_empty_track() {
        let track = Track::from_points(vec![], 60).unwrap();
        let feature = track_to_feature(&track);

        assert!(feature.bbox.is_none());
        match feature.geometry.map(|g| g.value) {
            Some(GeoJsonValue::LineString(coords)) => assert!(coords.is_empty()),
            other => panic!("Expected LineString geometry, got {other:?}"),
        }
    }
}
