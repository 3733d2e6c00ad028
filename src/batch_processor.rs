/// Batch processing of track files
///
/// Each file runs through its own pipeline on the rayon pool. Outcomes are
/// sorted by sheet name afterwards so the written plan never depends on
/// completion order.
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Result, TramosError};
use crate::plan_writer::{normalize_sheet_name, PlanSheet};
use crate::segment::{round2, FinalSegment};
use crate::segment_pipeline::{compute_segments_traced, PipelineTrace, Thresholds};
use crate::track_reader::read_track;

/// A track file that made it through the pipeline.
#[derive(Debug, Clone)]
pub struct ProcessedTrack {
    pub track_name: String,
    pub points: usize,
    pub skipped_points: usize,
    pub segments: Vec<FinalSegment>,
    pub trace: PipelineTrace,
}

#[derive(Debug)]
pub struct TrackOutcome {
    pub path: PathBuf,
    pub sheet_name: String,
    pub result: Result<ProcessedTrack>,
}

pub fn is_gpx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gpx"))
        .unwrap_or(false)
}

pub fn sheet_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    normalize_sheet_name(&stem)
}

/// GPX files directly inside `folder`, symlinked ones included. Subfolders are not searched.
pub fn discover_tracks(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut gpx_files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_gpx_file(entry.path()) {
            gpx_files.push(entry.path().to_path_buf());
        }
    }
    gpx_files.sort();
    Ok(gpx_files)
}

pub fn process_track_file(path: &Path, thresholds: &Thresholds) -> Result<ProcessedTrack> {
    let track = read_track(path)?;
    let source_name = path.display().to_string();
    let (segments, trace) = compute_segments_traced(&track.points, thresholds, &source_name)?;

    Ok(ProcessedTrack {
        track_name: track.name,
        points: track.points.len(),
        skipped_points: track.skipped_points,
        segments,
        trace,
    })
}

/// Run every file on a pool of `jobs` workers and return the outcomes sorted
/// by sheet name, then path.
pub fn process_batch(paths: &[PathBuf], thresholds: &Thresholds, jobs: usize) -> Result<Vec<TrackOutcome>> {
    thresholds.validate()?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;

    let mut outcomes: Vec<TrackOutcome> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let result = process_track_file(path, thresholds);
                match &result {
                    Ok(processed) => info!(
                        "✅ {}: {} points -> {} segments",
                        path.display(),
                        processed.points,
                        processed.segments.len()
                    ),
                    Err(e) => warn!("⚠️  Error processing {}: {}", path.display(), e),
                }
                TrackOutcome {
                    path: path.clone(),
                    sheet_name: sheet_name_for(path),
                    result,
                }
            })
            .collect()
    });

    outcomes.sort_by(|a, b| a.sheet_name.cmp(&b.sheet_name).then_with(|| a.path.cmp(&b.path)));
    Ok(outcomes)
}

/// Sheets for every successful outcome, in outcome order.
pub fn plan_sheets(outcomes: &[TrackOutcome]) -> Vec<PlanSheet> {
    outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.result.as_ref().ok().map(|processed| PlanSheet {
                name: outcome.sheet_name.clone(),
                segments: processed.segments.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    filename: String,
    sheet: String,
    points: usize,
    skipped_points: usize,
    raw_segments: usize,
    final_segments: usize,
    total_distance_km: f64,
    total_ascent_m: f64,
    total_descent_m: f64,
    status: String,
}

impl ReportRow {
    pub fn from_outcome(outcome: &TrackOutcome) -> Self {
        let filename = outcome
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        match &outcome.result {
            Ok(processed) => {
                // `Sum` for f64 starts at -0.0, which would print as "-0.0" for an empty side.
                let distance_m: f64 = processed.segments.iter().map(|s| s.distance_m).fold(0.0, |acc, x| acc + x);
                let ascent_m: f64 = processed
                    .segments
                    .iter()
                    .filter(|s| s.elevation_m > 0.0)
                    .map(|s| s.elevation_m)
                    .fold(0.0, |acc, x| acc + x);
                let descent_m: f64 = processed
                    .segments
                    .iter()
                    .filter(|s| s.elevation_m < 0.0)
                    .map(|s| -s.elevation_m)
                    .fold(0.0, |acc, x| acc + x);

                ReportRow {
                    filename,
                    sheet: outcome.sheet_name.clone(),
                    points: processed.points,
                    skipped_points: processed.skipped_points,
                    raw_segments: processed.trace.raw,
                    final_segments: processed.segments.len(),
                    total_distance_km: round2(distance_m / 1000.0),
                    total_ascent_m: round2(ascent_m),
                    total_descent_m: round2(descent_m),
                    status: "OK".to_string(),
                }
            }
            Err(e) => ReportRow {
                filename,
                sheet: outcome.sheet_name.clone(),
                points: 0,
                skipped_points: 0,
                raw_segments: 0,
                final_segments: 0,
                total_distance_km: 0.0,
                total_ascent_m: 0.0,
                total_descent_m: 0.0,
                status: format!("ERROR: {}", e),
            },
        }
    }
}

pub fn write_report(path: &Path, outcomes: &[TrackOutcome]) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for outcome in outcomes {
        wtr.serialize(ReportRow::from_outcome(outcome))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Fails with [`TramosError::NoSegments`] when no outcome succeeded.
pub fn ensure_any_segments(outcomes: &[TrackOutcome], source: &Path) -> Result<()> {
    if outcomes.iter().any(|outcome| outcome.result.is_ok()) {
        Ok(())
    } else {
        Err(TramosError::NoSegments {
            source_name: source.display().to_string(),
        })
    }
}
