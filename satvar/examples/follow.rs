//! Example of a live session: feed locations, then render a map that
//! follows the user and rotates with the heading.
//!
//! Run with: cargo run --example follow -- /path/to/track.gpx

use satvar::{MapServiceBuilder, SatvarError};
use std::env;

fn main() -> Result<(), SatvarError> {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example follow -- /path/to/track.gpx");
        std::process::exit(1);
    });

    let service = MapServiceBuilder::new(&path).follow_user(true).build();
    let track = service.load_track()?;
    println!("{}", track);

    // Walk the first stretch of the track as if a rider reported it live
    for point in track.points().iter().step_by(10).take(10) {
        service.update_location(
            "rider",
            &point.longitude.to_string(),
            &point.latitude.to_string(),
        )?;
    }

    println!("Heading: {:.1}°", service.direction("rider"));
    match service.generate_map("rider")? {
        Some(drawing) => {
            let vb = drawing.view_box();
            println!("Viewport: {} {} {} {}", vb.x, vb.y, vb.width, vb.height);
            if let Some(rotation) = drawing.rotation() {
                println!("Rotation: {:.1}°", rotation.degrees);
            }
        }
        None => println!("Nothing to draw"),
    }

    Ok(())
}
