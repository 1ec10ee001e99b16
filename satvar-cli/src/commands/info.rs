use anyhow::Result;
use satvar::BoundingBox;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct TrackInfo {
    path: String,
    points: usize,
    distance_km: f64,
    elevation_gain_m: f64,
    elevation_loss_m: f64,
    bounds: Option<BoundingBox>,
}

pub fn run(track_path: PathBuf, chunk_size: usize, json: bool) -> Result<()> {
    let track = super::load_track(&track_path, chunk_size)?;
    let bounds = BoundingBox::from_points(track.points());

    if json {
        let info = TrackInfo {
            path: track_path.display().to_string(),
            points: track.len(),
            distance_km: track.distance_km(),
            elevation_gain_m: track.elevation_gain_m(),
            elevation_loss_m: track.elevation_loss_m(),
            bounds,
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Track: {}", track_path.display());
    println!("{}", track);
    println!();
    println!("Points: {}", track.len());
    println!("Distance: {:.2} km", track.distance_km());
    println!(
        "Elevation: +{:.0}m / -{:.0}m (window {} samples)",
        track.elevation_gain_m(),
        track.elevation_loss_m(),
        chunk_size
    );

    if let Some(b) = bounds {
        println!(
            "Bounds: {:.5},{:.5} - {:.5},{:.5} (lat,lon)",
            b.min_lat, b.min_lon, b.max_lat, b.max_lon
        );
    }

    Ok(())
}
