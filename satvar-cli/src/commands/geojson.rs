use anyhow::Result;
use geojson::GeoJson;
use satvar::geojson::track_to_feature;
use std::io::Write;
use std::path::PathBuf;

pub fn run(track_path: PathBuf, chunk_size: usize, output: Option<PathBuf>) -> Result<()> {
    let track = super::load_track(&track_path, chunk_size)?;
    let result = GeoJson::Feature(track_to_feature(&track));

    let mut writer = super::open_output(output.as_deref())?;
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = output {
        println!("Output written to: {}", path.display());
    }
    Ok(())
}
