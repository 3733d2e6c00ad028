/// Threshold reducers - absorb insignificant or implausible segments into their predecessor.
///
/// Both passes walk the sequence with one accumulator. A segment that satisfies
/// the pass's merge rule is absorbed; any other segment flushes the accumulator
/// and starts a new one. The first segment is never tested, it only seeds the
/// accumulator.
use crate::segment::Segment;

/// Slope ratio above which pass 1 treats a segment as a bad reading.
pub const PASS1_MAX_SLOPE: f64 = 0.6;

/// Pass 2 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyGate {
    pub max_slope: f64,
    pub min_segment_length: f64,
    pub min_horizontal_for_combined: f64,
    pub min_elevation_for_combined: f64,
}

/// Why pass 2 merged a segment. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    ExcessiveSlope,
    TooShort,
    JointlyInsignificant,
}

impl PolicyGate {
    pub fn merge_rule(&self, segment: &Segment) -> Option<MergeRule> {
        if segment.slope_ratio() > self.max_slope {
            Some(MergeRule::ExcessiveSlope)
        } else if segment.distance.abs() < self.min_segment_length {
            Some(MergeRule::TooShort)
        } else if segment.distance.abs() < self.min_horizontal_for_combined
            && segment.elevation.abs() < self.min_elevation_for_combined
        {
            Some(MergeRule::JointlyInsignificant)
        } else {
            None
        }
    }
}

fn merge_forward<F>(segments: &[Segment], should_merge: F) -> Vec<Segment>
where
    F: Fn(&Segment) -> bool,
{
    let Some((first, rest)) = segments.split_first() else {
        return Vec::new();
    };

    let mut reduced = Vec::new();
    let mut current = *first;

    for segment in rest {
        if should_merge(segment) {
            current.absorb(segment);
        } else {
            reduced.push(current);
            current = *segment;
        }
    }

    reduced.push(current);
    reduced
}

/// Pass 1: merge segments whose climb is under `elevation_threshold`, or whose
/// slope exceeds [`PASS1_MAX_SLOPE`] whatever their climb.
pub fn reduce_by_elevation(segments: &[Segment], elevation_threshold: f64) -> Vec<Segment> {
    merge_forward(segments, |s| {
        s.elevation.abs() < elevation_threshold || s.slope_ratio() > PASS1_MAX_SLOPE
    })
}

/// Pass 2: merge segments matching any [`MergeRule`] of `gate`.
pub fn reduce_by_policy(segments: &[Segment], gate: &PolicyGate) -> Vec<Segment> {
    merge_forward(segments, |s| gate.merge_rule(s).is_some())
}
