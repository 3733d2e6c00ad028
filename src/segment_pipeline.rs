/// Segment reduction pipeline
///
/// Raw micro-segments -> direction runs -> elevation pass -> direction runs ->
/// policy pass -> direction runs -> leading-segment fixup -> enumeration.
use log::debug;

use crate::direction_grouper::group_by_direction;
use crate::error::{Result, TramosError};
use crate::segment::{round2, Direction, FinalSegment, Segment, TrackPoint};
use crate::segment_deriver::derive_segments;
use crate::threshold_reducer::{reduce_by_elevation, reduce_by_policy, PolicyGate};

// Defaults used by the planning sheets
pub const DEFAULT_ELEVATION_THRESHOLD: f64 = 10.0;
pub const DEFAULT_MAX_SLOPE: f64 = 0.6;
pub const DEFAULT_MIN_SEGMENT_LENGTH: f64 = 100.0;
pub const DEFAULT_MIN_HORIZONTAL: f64 = 300.0;
pub const DEFAULT_MIN_ELEVATION: f64 = 25.0;

/// User-tunable thresholds. A value of 0 disables the corresponding merge rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum net climb (m) for a run to stand alone in the elevation pass.
    pub elevation_threshold: f64,
    /// Maximum plausible slope, as a fraction (0.6 = 60%).
    pub max_slope: f64,
    /// Minimum horizontal length (m) of a segment.
    pub min_segment_length: f64,
    /// Horizontal half of the combined rule (m).
    pub min_horizontal_for_combined: f64,
    /// Elevation half of the combined rule (m).
    pub min_elevation_for_combined: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            elevation_threshold: DEFAULT_ELEVATION_THRESHOLD,
            max_slope: DEFAULT_MAX_SLOPE,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            min_horizontal_for_combined: DEFAULT_MIN_HORIZONTAL,
            min_elevation_for_combined: DEFAULT_MIN_ELEVATION,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("elevation_threshold", self.elevation_threshold),
            ("max_slope", self.max_slope),
            ("min_segment_length", self.min_segment_length),
            ("min_horizontal_for_combined", self.min_horizontal_for_combined),
            ("min_elevation_for_combined", self.min_elevation_for_combined),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(TramosError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    pub fn policy_gate(&self) -> PolicyGate {
        PolicyGate {
            max_slope: self.max_slope,
            min_segment_length: self.min_segment_length,
            min_horizontal_for_combined: self.min_horizontal_for_combined,
            min_elevation_for_combined: self.min_elevation_for_combined,
        }
    }
}

/// Segment counts after each stage of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineTrace {
    pub raw: usize,
    pub grouped: usize,
    pub elevation_pass: usize,
    pub regrouped: usize,
    pub policy_pass: usize,
    pub final_count: usize,
}

/// Reduce a filtered track to its final segment list.
///
/// `points` must already exclude samples without elevation or at/below the
/// minimum valid elevation. `source_name` only labels the error when nothing
/// could be computed.
pub fn compute_segments(
    points: &[TrackPoint],
    thresholds: &Thresholds,
    source_name: &str,
) -> Result<Vec<FinalSegment>> {
    compute_segments_traced(points, thresholds, source_name).map(|(segments, _)| segments)
}

pub fn compute_segments_traced(
    points: &[TrackPoint],
    thresholds: &Thresholds,
    source_name: &str,
) -> Result<(Vec<FinalSegment>, PipelineTrace)> {
    thresholds.validate()?;

    let raw = derive_segments(points);
    let (reduced, trace) = reduce_segments(&raw, thresholds);
    debug!("🔍 {}: {:?}", source_name, trace);

    if reduced.is_empty() {
        return Err(TramosError::NoSegments {
            source_name: source_name.to_string(),
        });
    }

    Ok((enumerate_segments(&reduced), trace))
}

/// Every merging stage plus the leading fixup, without rounding.
pub fn reduce_segments(raw: &[Segment], thresholds: &Thresholds) -> (Vec<Segment>, PipelineTrace) {
    let grouped = group_by_direction(raw);
    let elevation_pass = reduce_by_elevation(&grouped, thresholds.elevation_threshold);
    let regrouped = group_by_direction(&elevation_pass);
    let policy_pass = reduce_by_policy(&regrouped, &thresholds.policy_gate());
    let mut candidates = group_by_direction(&policy_pass);
    absorb_leading_segment(&mut candidates, thresholds);

    let trace = PipelineTrace {
        raw: raw.len(),
        grouped: grouped.len(),
        elevation_pass: elevation_pass.len(),
        regrouped: regrouped.len(),
        policy_pass: policy_pass.len(),
        final_count: candidates.len(),
    };
    (candidates, trace)
}

/// Fold an insignificant first segment into the second one. Only the leading
/// position is checked, and only when a successor exists.
pub fn absorb_leading_segment(segments: &mut Vec<Segment>, thresholds: &Thresholds) {
    if segments.len() < 2 {
        return;
    }
    let first = segments[0];
    if first.elevation.abs() < thresholds.elevation_threshold
        || first.distance.abs() < thresholds.min_segment_length
    {
        segments[1].absorb(&first);
        segments.remove(0);
    }
}

pub fn enumerate_segments(segments: &[Segment]) -> Vec<FinalSegment> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let slope_percent = if segment.distance > 0.0 {
                round2(segment.elevation / segment.distance * 100.0)
            } else {
                0.0
            };
            // Label from the rounded value so the sheet never shows "0.0" as a climb.
            let elevation_m = round2(segment.elevation);
            FinalSegment {
                index: i + 1,
                distance_m: round2(segment.distance),
                elevation_m,
                slope_percent,
                direction: Direction::from_elevation(elevation_m),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(distance: f64, elevation: f64) -> Segment {
        Segment::new(distance, elevation)
    }

    /// Points one millidegree apart along the equator (~111.19m each).
    fn equator_track(elevations: &[f64]) -> Vec<TrackPoint> {
        elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackPoint::new(0.0, i as f64 * 0.001, e))
            .collect()
    }

    #[test]
    fn test_three_point_climb() {
        let points = equator_track(&[10.0, 10.0, 50.0]);
        let raw = derive_segments(&points);
        assert_eq!(raw.len(), 2);

        let result = compute_segments(&points, &Thresholds::default(), "climb").unwrap();
        assert_eq!(result.len(), 1);
        let only = &result[0];
        assert_eq!(only.index, 1);
        assert_eq!(only.direction, Direction::Ascent);
        assert_eq!(only.elevation_m, 40.0);
        assert!((only.distance_m - 222.39).abs() < 0.011);
        assert!((only.slope_percent - 17.99).abs() < 0.011);
    }

    #[test]
    fn test_all_flat_track_collapses() {
        let points = equator_track(&[100.0; 40]);
        let result = compute_segments(&points, &Thresholds::default(), "flat").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].elevation_m, 0.0);
        assert_eq!(result[0].slope_percent, 0.0);
        assert_eq!(result[0].direction, Direction::Flat);
        assert!((result[0].distance_m - 39.0 * 111.19).abs() < 1.0);
    }

    #[test]
    fn test_near_flat_track_is_labelled_flat() {
        let points = equator_track(&[100.0, 100.0, 100.004]);
        let result = compute_segments(&points, &Thresholds::default(), "near-flat").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].elevation_m, 0.0);
        assert_eq!(result[0].direction, Direction::Flat);

        let descent = enumerate_segments(&[seg(500.0, -0.004)]);
        assert_eq!(descent[0].direction, Direction::Flat);
    }

    #[test]
    fn test_two_point_track_does_not_fault() {
        let points = equator_track(&[200.0, 203.0]);
        let result = compute_segments(&points, &Thresholds::default(), "short").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].elevation_m, 3.0);
    }

    #[test]
    fn test_no_segments_outcome() {
        let thresholds = Thresholds::default();
        let single = equator_track(&[100.0]);
        assert!(matches!(
            compute_segments(&single, &thresholds, "one"),
            Err(TramosError::NoSegments { .. })
        ));
        let stacked = vec![TrackPoint::new(1.0, 1.0, 100.0); 5];
        assert!(matches!(
            compute_segments(&stacked, &thresholds, "stacked"),
            Err(TramosError::NoSegments { .. })
        ));
        assert!(matches!(
            compute_segments(&[], &thresholds, "empty"),
            Err(TramosError::NoSegments { .. })
        ));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let points = equator_track(&[10.0, 20.0]);
        let thresholds = Thresholds {
            min_segment_length: -1.0,
            ..Thresholds::default()
        };
        assert!(matches!(
            compute_segments(&points, &thresholds, "bad"),
            Err(TramosError::InvalidThreshold { name: "min_segment_length", .. })
        ));
        let thresholds = Thresholds {
            max_slope: f64::NAN,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_err());
        assert!(Thresholds::default().validate().is_ok());
    }

    #[test]
    fn test_leading_fixup() {
        let thresholds = Thresholds::default();

        let mut short_first = vec![seg(50.0, 30.0), seg(900.0, -80.0)];
        absorb_leading_segment(&mut short_first, &thresholds);
        assert_eq!(short_first, vec![seg(950.0, -50.0)]);

        let mut flat_first = vec![seg(500.0, -5.0), seg(900.0, 80.0), seg(400.0, -60.0)];
        absorb_leading_segment(&mut flat_first, &thresholds);
        assert_eq!(flat_first, vec![seg(1400.0, 75.0), seg(400.0, -60.0)]);

        let mut significant = vec![seg(500.0, 50.0), seg(900.0, -80.0)];
        absorb_leading_segment(&mut significant, &thresholds);
        assert_eq!(significant.len(), 2);

        let mut single = vec![seg(10.0, 1.0)];
        absorb_leading_segment(&mut single, &thresholds);
        assert_eq!(single, vec![seg(10.0, 1.0)]);

        let mut empty: Vec<Segment> = Vec::new();
        absorb_leading_segment(&mut empty, &thresholds);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_enumeration_rounds_independently() {
        let enumerated = enumerate_segments(&[seg(1234.5678, -56.789), seg(0.0, 0.0)]);
        assert_eq!(enumerated[0].index, 1);
        assert_eq!(enumerated[0].distance_m, 1234.57);
        assert_eq!(enumerated[0].elevation_m, -56.79);
        assert_eq!(enumerated[0].slope_percent, -4.6);
        assert_eq!(enumerated[0].direction, Direction::Descent);
        assert_eq!(enumerated[1].index, 2);
        assert_eq!(enumerated[1].slope_percent, 0.0);
    }

    /// A hill: climb 120m, descend 90m, with sensor jitter throughout.
    fn hill_track() -> Vec<TrackPoint> {
        let mut elevations = Vec::new();
        let mut e = 400.0;
        for i in 0..60 {
            e += if i % 5 == 4 { -1.0 } else { 3.0 };
            elevations.push(e);
        }
        for i in 0..45 {
            e += if i % 4 == 3 { 1.5 } else { -3.0 };
            elevations.push(e);
        }
        equator_track(&elevations)
    }

    #[test]
    fn test_conservation_of_distance_and_elevation() {
        let points = hill_track();
        let raw = derive_segments(&points);
        let (reduced, trace) = reduce_segments(&raw, &Thresholds::default());

        let raw_distance: f64 = raw.iter().map(|s| s.distance).sum();
        let raw_elevation: f64 = raw.iter().map(|s| s.elevation).sum();
        let final_distance: f64 = reduced.iter().map(|s| s.distance).sum();
        let final_elevation: f64 = reduced.iter().map(|s| s.elevation).sum();

        assert!((raw_distance - final_distance).abs() < 1e-6);
        assert!((raw_elevation - final_elevation).abs() < 1e-6);
        assert_eq!(trace.raw, raw.len());
        assert_eq!(trace.final_count, reduced.len());
        assert!(trace.grouped <= trace.raw);
    }

    #[test]
    fn test_hill_reduces_to_climb_and_descent() {
        let result = compute_segments(&hill_track(), &Thresholds::default(), "hill").unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].direction, Direction::Ascent);
        assert_eq!(result[1].direction, Direction::Descent);
        for pair in result.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }

    #[test]
    fn test_raising_elevation_threshold_never_adds_segments() {
        let points = hill_track();
        let mut previous = usize::MAX;
        for threshold in [0.0, 2.0, 5.0, 10.0, 50.0, 200.0] {
            let thresholds = Thresholds {
                elevation_threshold: threshold,
                ..Thresholds::default()
            };
            let count = compute_segments(&points, &thresholds, "hill").unwrap().len();
            assert!(count <= previous, "threshold {} gave {} > {}", threshold, count, previous);
            previous = count;
        }
    }

    #[test]
    fn test_deterministic() {
        let points = hill_track();
        let a = compute_segments(&points, &Thresholds::default(), "hill").unwrap();
        let b = compute_segments(&points, &Thresholds::default(), "hill").unwrap();
        assert_eq!(a, b);
    }
}
