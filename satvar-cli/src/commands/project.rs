use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use satvar::{project_track, Resolution};
use std::path::PathBuf;

pub fn run(
    track_path: PathBuf,
    chunk_size: usize,
    resolution: Resolution,
    output: Option<PathBuf>,
) -> Result<()> {
    let track = super::load_track(&track_path, chunk_size)?;
    let mut writer = csv::Writer::from_writer(super::open_output(output.as_deref())?);
    writer.write_record(["index", "lat", "lon", "ele", "x", "y"])?;

    let Some(projection) = project_track(track.points(), None, resolution) else {
        writer.flush()?;
        return Ok(());
    };

    // Progress only when writing to a file
    let pb = if output.is_some() {
        let pb = ProgressBar::new(projection.points.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    for (point, projected) in track.points().iter().zip(&projection.points) {
        let index = projected
            .source_index
            .context("Projected track point without source index")?;
        writer.write_record(&[
            index.to_string(),
            point.latitude.to_string(),
            point.longitude.to_string(),
            point.elevation.to_string(),
            projected.x.to_string(),
            projected.y.to_string(),
        ])?;
        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    if let Some(path) = output {
        println!(
            "Output written to: {} ({}x{} px canvas)",
            path.display(),
            projection.width,
            projection.height
        );
    }
    Ok(())
}
