//! GPX track parsing.
//!
//! Only the parts of a GPX document needed to rebuild a route are read:
//! the `lat`/`lon` attributes and the `<ele>` child of every `<trkpt>`.
//! Waypoints, routes, timestamps and extensions are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, SatvarError};
use crate::track::TrackPoint;

/// Parse a GPX document into the ordered points of its single track.
///
/// All segments of the track are concatenated in document order. A point
/// without an `<ele>` child gets an elevation of 0 m.
///
/// # Errors
///
/// Returns an error if:
/// - The XML is malformed
/// - A `<trkpt>` has a missing or non-numeric `lat`/`lon` attribute
/// - The document does not contain exactly one `<trk>`
pub fn parse_track(xml: &[u8]) -> Result<Vec<TrackPoint>> {
    let mut reader = Reader::from_reader(xml);
    let mut tracks = 0usize;
    let mut points = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"trk" => tracks += 1,
                b"trkpt" if tracks > 0 => {
                    let (latitude, longitude) = parse_lat_lon(&e)?;
                    let elevation = parse_point_children(&mut reader)?;
                    points.push(TrackPoint::new(latitude, longitude, elevation));
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"trk" => tracks += 1,
                b"trkpt" if tracks > 0 => {
                    let (latitude, longitude) = parse_lat_lon(&e)?;
                    points.push(TrackPoint::new(latitude, longitude, 0.0));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if tracks != 1 {
        return Err(SatvarError::TrackCount { found: tracks });
    }

    tracing::trace!(points = points.len(), "Parsed GPX track");
    Ok(points)
}

/// Parse lat/lon attributes from a `<trkpt>` start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let target = match attr.key.local_name().as_ref() {
            b"lat" => &mut lat,
            b"lon" => &mut lon,
            _ => continue,
        };
        let value = std::str::from_utf8(&attr.value).unwrap_or_default();
        *target = Some(parse_number(value).ok_or_else(|| SatvarError::InvalidGpx {
            reason: format!("invalid coordinate {value:?} on <trkpt>"),
        })?);
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(SatvarError::InvalidGpx {
            reason: "<trkpt> without lat/lon attributes".to_string(),
        }),
    }
}

/// Read the children of a `<trkpt>` up to its end tag, returning the elevation.
fn parse_point_children(reader: &mut Reader<&[u8]>) -> Result<f64> {
    let mut elevation = 0.0;
    let mut in_ele = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                in_ele = depth == 1 && e.local_name().as_ref() == b"ele";
            }
            Event::Text(e) if in_ele => {
                let text = std::str::from_utf8(&e).unwrap_or_default();
                elevation = parse_number(text).ok_or_else(|| SatvarError::InvalidGpx {
                    reason: format!("invalid elevation {:?}", text.trim()),
                })?;
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                in_ele = false;
            }
            Event::Eof => {
                return Err(SatvarError::InvalidGpx {
                    reason: "unexpected end of document inside <trkpt>".to_string(),
                })
            }
            _ => {}
        }
    }

    Ok(elevation)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
