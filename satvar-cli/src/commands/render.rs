use anyhow::{bail, Context, Result};
use satvar::{project_track, Location, MapRenderer, RenderOptions, Resolution};
use std::io::Write;
use std::path::PathBuf;

pub struct RenderArgs {
    pub track: PathBuf,
    pub chunk_size: usize,
    pub resolution: Resolution,
    /// User position as (lat, lon).
    pub user: Option<(f64, f64)>,
    pub heading: f64,
    pub follow: bool,
    pub rotate: bool,
    pub output: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let track = super::load_track(&args.track, args.chunk_size)?;

    let user = args
        .user
        .map(|(lat, lon)| Location::new(lon, lat))
        .transpose()
        .context("Invalid user location")?;

    let Some(projection) = project_track(track.points(), user.as_ref(), args.resolution) else {
        bail!("Nothing to draw: {} has no points", args.track.display());
    };

    let renderer = MapRenderer::new(RenderOptions {
        follow_user: args.follow,
        rotate_with_heading: args.rotate,
        ..RenderOptions::default()
    });

    let Some(drawing) = renderer.render(&projection, args.heading) else {
        bail!("Nothing to draw: {} has no points", args.track.display());
    };

    let mut out = super::open_output(args.output.as_deref())?;
    out.write_all(drawing.to_svg().as_bytes())?;
    writeln!(out)?;
    out.flush()?;

    if let Some(path) = &args.output {
        println!(
            "Map written to: {} ({}x{} px)",
            path.display(),
            projection.width,
            projection.height
        );
    }

    Ok(())
}
