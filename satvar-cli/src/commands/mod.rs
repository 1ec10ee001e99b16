pub mod geojson;
pub mod info;
pub mod project;
pub mod render;

use anyhow::{Context, Result};
use satvar::Track;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Load a track, attaching the path to any error.
pub fn load_track(path: &Path, chunk_size: usize) -> Result<Track> {
    Track::from_file(path, chunk_size)
        .with_context(|| format!("Failed to load track {}", path.display()))
}

/// Open the output file, or stdout if none is given.
pub fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
