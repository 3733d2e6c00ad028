/// Distance/elevation deriver - turns consecutive track points into raw micro-segments.
use crate::segment::{Segment, TrackPoint};

/// Sphere radius used by the planning sheets (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points on a sphere of radius [`EARTH_RADIUS_M`].
pub fn haversine_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let d_phi = (b.latitude() - a.latitude()).to_radians();
    let d_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// One segment per consecutive point pair. Pairs with zero horizontal
/// distance (duplicate fixes) are dropped, not merged.
pub fn derive_segments(points: &[TrackPoint]) -> Vec<Segment> {
    points
        .windows(2)
        .filter_map(|w| {
            let distance = haversine_distance(&w[0], &w[1]);
            if distance > 0.0 {
                Some(Segment::new(distance, w[1].elevation - w[0].elevation))
            } else {
                None
            }
        })
        .collect()
}
