//! Integration tests for the HTTP API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use satvar::MapServiceBuilder;
use satvar_service::{router, AppState};
use serde_json::Value;
use tempfile::TempDir;

/// Write a straight north-east GPX track of `n` points, one per 0.0001°.
fn create_test_track(dir: &Path, n: usize) -> PathBuf {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"><trk><name>test</name><trkseg>"#,
    );
    for i in 0..n {
        let step = i as f64 * 0.0001;
        xml.push_str(&format!(
            r#"<trkpt lat="{}" lon="{}"><ele>{}</ele></trkpt>"#,
            54.0 + step,
            25.0 + step,
            100 + i
        ));
    }
    xml.push_str("</trkseg></trk></gpx>");

    let path = dir.join("track.gpx");
    std::fs::write(&path, xml).unwrap();
    path
}

fn create_server(builder: MapServiceBuilder) -> TestServer {
    let state = Arc::new(AppState {
        map_service: builder.build(),
    });
    TestServer::new(router(state)).unwrap()
}

/// Create a test server showing an 11 point track.
fn create_test_server(temp_dir: &TempDir) -> TestServer {
    let path = create_test_track(temp_dir.path(), 11);
    create_server(MapServiceBuilder::new(path))
}

#[tokio::test]
async fn test_map_without_location() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/map").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/svg+xml");
    let svg = response.text();
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains(r#"viewBox="0 0 10 10""#));
    assert!(svg.contains(r#"<polyline points="0,10 5,5 10,0""#));
    assert!(!svg.contains("fill:green"));
}

#[tokio::test]
async fn test_map_with_location() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server
        .get("/map?session=rider&lat=54.0005&long=25.0005")
        .await;

    response.assert_status_ok();
    let svg = response.text();
    assert!(svg.contains(r#"<circle cx="5" cy="5" r="10" style="fill:green"/>"#));

    // The location is kept for later requests of the same session
    let svg = server.get("/map?session=rider").await.text();
    assert!(svg.contains("fill:green"));

    // Other sessions are unaffected
    let svg = server.get("/map?session=other").await.text();
    assert!(!svg.contains("fill:green"));
}

#[tokio::test]
async fn test_map_follow_user() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_test_track(temp_dir.path(), 11);
    let server = create_server(MapServiceBuilder::new(path).follow_user(true));

    let response = server.get("/map?lat=54.0005&long=25.0005").await;

    response.assert_status_ok();
    let svg = response.text();
    assert!(svg.contains(r#"viewBox="-595 -595 1200 1200""#));
    assert!(svg.contains(r#"<g transform="rotate(270.000000, 5, 5)">"#));
}

#[tokio::test]
async fn test_map_invalid_coordinates() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    // Not a number
    let response = server.get("/map?lat=north&long=25.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("latitude"));

    // Latitude out of range
    let response = server.get("/map?lat=91.0&long=25.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("out of range"));

    // Only one coordinate
    let response = server.get("/map?lat=54.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_map_invalid_location_keeps_previous() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    server.get("/map?lat=54.0005&long=25.0005").await;
    server
        .get("/map?lat=54.0&long=east")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let svg = server.get("/map").await.text();
    assert!(svg.contains(r#"<circle cx="5" cy="5" r="10" style="fill:green"/>"#));
}

#[tokio::test]
async fn test_map_empty_track() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_test_track(temp_dir.path(), 0);
    let server = create_server(MapServiceBuilder::new(path));

    let response = server.get("/map").await;
    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_map_missing_track() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_server(MapServiceBuilder::new(temp_dir.path().join("missing.gpx")));

    let response = server.get("/map").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("missing.gpx"));
}

#[tokio::test]
async fn test_map_demo_replay() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_test_track(temp_dir.path(), 11);
    let server = create_server(MapServiceBuilder::new(path).demo(true));

    // Track points 0, 5, 10, then back to 0
    let expected = [(0, 10), (5, 5), (10, 0), (0, 10)];
    for (x, y) in expected {
        let svg = server.get("/map?session=demo").await.text();
        let marker = format!(r#"<circle cx="{x}" cy="{y}" r="10" style="fill:green"/>"#);
        assert!(svg.contains(&marker), "missing {marker} in {svg}");
    }
}

#[tokio::test]
async fn test_post_location() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.post("/location/54.0005/25.0005?session=rider").await;
    response.assert_status(StatusCode::NO_CONTENT);

    let svg = server.get("/map?session=rider").await.text();
    assert!(svg.contains(r#"<circle cx="5" cy="5" r="10" style="fill:green"/>"#));
}

#[tokio::test]
async fn test_post_location_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.post("/location/54.0/200.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/location/abc/25.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_track_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/track").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["points"], 11);
    assert!(json["distance_km"].as_f64().unwrap() > 0.1);
    assert!(json["source"].as_str().unwrap().ends_with("track.gpx"));
    assert_eq!(json["bounds"]["min_lat"], 54.0);
    assert_eq!(json["bounds"]["min_lon"], 25.0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn test_stats_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    // Nothing loaded yet
    let response = server.get("/stats").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["active_sessions"], 0);
    assert_eq!(json["track_loaded"], false);

    server.get("/map?session=a&lat=54.0&long=25.0").await;
    server.get("/map?session=b&lat=54.0&long=25.0").await;

    let json: Value = server.get("/stats").await.json();
    assert_eq!(json["active_sessions"], 2);
    assert_eq!(json["track_loaded"], true);
    assert_eq!(json["track_points"], 11);
}
