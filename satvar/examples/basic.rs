//! Basic example demonstrating satvar library usage.
//!
//! Run with: cargo run --example basic -- /path/to/track.gpx [map.svg]

use satvar::{project_track, MapRenderer, Resolution, SatvarError, Track, DEFAULT_CHUNK_SIZE};
use std::env;

fn main() -> Result<(), SatvarError> {
    // Get track file from command line
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/track.gpx [map.svg]");
        std::process::exit(1);
    });
    let output = env::args().nth(2).unwrap_or_else(|| "map.svg".to_string());

    let track = Track::from_file(&path, DEFAULT_CHUNK_SIZE)?;

    println!("Track summary:");
    println!("{:-<50}", "");
    println!("  Points: {}", track.len());
    println!("  Distance: {:.2} km", track.distance_km());
    println!("  Gain: {:.0} m", track.elevation_gain_m());
    println!("  Loss: {:.0} m", track.elevation_loss_m());

    let Some(projection) = project_track(track.points(), None, Resolution::Coarse) else {
        println!("\nTrack is empty, nothing to draw");
        return Ok(());
    };
    println!(
        "\nCanvas: {}x{} px at {} m/px",
        projection.width,
        projection.height,
        Resolution::Coarse.meters_per_pixel()
    );

    if let Some(drawing) = MapRenderer::default().render(&projection, 0.0) {
        std::fs::write(&output, drawing.to_svg())?;
        println!("Map written to {}", output);
    }

    Ok(())
}
