/// GPX track reader
///
/// Flattens every track and track segment of a GPX document into one ordered
/// point list, keeping only fixes with a usable elevation.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use gpx::read;
use log::warn;

use crate::error::{Result, TramosError};
use crate::segment::TrackPoint;

/// Fixes at or below this elevation are treated as missing data.
pub const MIN_VALID_ELEVATION: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub points: Vec<TrackPoint>,
    /// Fixes dropped for missing or implausible elevation.
    pub skipped_points: usize,
}

pub fn read_track(path: &Path) -> Result<Track> {
    let file = File::open(path)?;
    let fallback_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    read_track_from_reader(BufReader::new(file), &fallback_name).map_err(|e| match e {
        TramosError::NoTracks(_) => TramosError::NoTracks(path.to_path_buf()),
        other => other,
    })
}

pub fn read_track_from_reader<R: Read>(reader: R, fallback_name: &str) -> Result<Track> {
    let gpx = read(reader)?;
    if gpx.tracks.is_empty() {
        return Err(TramosError::NoTracks(fallback_name.into()));
    }

    let name = gpx
        .tracks
        .first()
        .and_then(|track| track.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    let mut points = Vec::new();
    let mut skipped_points = 0;

    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                match waypoint.elevation {
                    Some(elevation) if elevation > MIN_VALID_ELEVATION => {
                        let position = waypoint.point();
                        points.push(TrackPoint::new(position.y(), position.x(), elevation));
                    }
                    _ => skipped_points += 1,
                }
            }
        }
    }

    if skipped_points > 0 {
        warn!(
            "⚠️  {}: skipped {} points without usable elevation",
            name, skipped_points
        );
    }

    Ok(Track {
        name,
        points,
        skipped_points,
    })
}
