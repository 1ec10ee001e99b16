use anyhow::Result;
use clap::{Parser, Subcommand};
use satvar::Resolution;
use std::path::PathBuf;

mod commands;

/// GPS track metrics and route map CLI tool
#[derive(Parser)]
#[command(name = "satvar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Elevation smoothing window in samples
    #[arg(
        short,
        long,
        env = "SATVAR_CHUNK_SIZE",
        default_value = "60",
        global = true
    )]
    chunk_size: usize,

    /// Projection resolution: coarse, fine or precise
    #[arg(
        short,
        long,
        env = "SATVAR_RESOLUTION",
        default_value = "coarse",
        global = true
    )]
    resolution: Resolution,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display distance and elevation summary of a track
    Info {
        /// GPX file (.gpx, .gpx.gz, or .gpx with a .gpx.zip next to it)
        track: PathBuf,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Render the route map as SVG
    Render {
        /// GPX file
        track: PathBuf,

        /// Latitude of the user marker
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the user marker
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Heading of the user in degrees (0 = east, 90 = north)
        #[arg(long, default_value = "0")]
        heading: f64,

        /// Center the map on the user marker
        #[arg(short, long, requires = "lat")]
        follow: bool,

        /// Keep north up while following the user
        #[arg(long)]
        no_rotate: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export projected pixel coordinates as CSV
    Project {
        /// GPX file
        track: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the track as a GeoJSON feature
    Geojson {
        /// GPX file
        track: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { track, json } => commands::info::run(track, cli.chunk_size, json),
        Commands::Render {
            track,
            lat,
            lon,
            heading,
            follow,
            no_rotate,
            output,
        } => commands::render::run(commands::render::RenderArgs {
            track,
            chunk_size: cli.chunk_size,
            resolution: cli.resolution,
            user: lat.zip(lon),
            heading,
            follow,
            rotate: !no_rotate,
            output,
        }),
        Commands::Project { track, output } => {
            commands::project::run(track, cli.chunk_size, cli.resolution, output)
        }
        Commands::Geojson { track, output } => {
            commands::geojson::run(track, cli.chunk_size, output)
        }
    }
}
