/// Track points and the segment records the reduction passes operate on.
use geo::Point;
use serde::Serialize;

/// A single GPS fix that survived elevation filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// x = longitude, y = latitude, both in degrees.
    pub position: Point<f64>,
    pub elevation: f64,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        TrackPoint {
            position: Point::new(longitude, latitude),
            elevation,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

/// Aggregated stretch of track: horizontal distance plus net elevation change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub distance: f64,
    pub elevation: f64,
}

impl Segment {
    pub fn new(distance: f64, elevation: f64) -> Self {
        Segment { distance, elevation }
    }

    /// Absorb `other` into this segment. Both fields sum additively.
    pub fn absorb(&mut self, other: &Segment) {
        self.distance += other.distance;
        self.elevation += other.elevation;
    }

    pub fn sign_class(&self) -> SignClass {
        if self.elevation >= 0.0 {
            SignClass::Ascending
        } else {
            SignClass::Descending
        }
    }

    /// |elevation| / |distance|. A zero distance is treated as an infinitely
    /// steep reading so the slope gates always merge it.
    pub fn slope_ratio(&self) -> f64 {
        if self.distance == 0.0 {
            f64::INFINITY
        } else {
            self.elevation.abs() / self.distance.abs()
        }
    }
}

/// Direction-run membership. Zero elevation counts as ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignClass {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Ascent,
    Descent,
    Flat,
}

impl Direction {
    pub fn from_elevation(elevation: f64) -> Self {
        if elevation > 0.0 {
            Direction::Ascent
        } else if elevation < 0.0 {
            Direction::Descent
        } else {
            Direction::Flat
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Ascent => "Ascent",
            Direction::Descent => "Descent",
            Direction::Flat => "Flat",
        }
    }
}

/// Enumerated, rounded segment emitted at the end of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalSegment {
    pub index: usize,
    pub distance_m: f64,
    pub elevation_m: f64,
    pub slope_percent: f64,
    pub direction: Direction,
}

/// Round to 2 decimals. Values that round to zero come back as +0.0.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_sums_both_fields() {
        let mut acc = Segment::new(100.0, 5.0);
        acc.absorb(&Segment::new(50.0, -8.0));
        assert_eq!(acc, Segment::new(150.0, -3.0));
    }

    #[test]
    fn test_zero_elevation_is_ascending() {
        assert_eq!(Segment::new(10.0, 0.0).sign_class(), SignClass::Ascending);
        assert_eq!(Segment::new(10.0, -0.01).sign_class(), SignClass::Descending);
    }

    #[test]
    fn test_zero_distance_slope_is_saturated() {
        assert!(Segment::new(0.0, 3.0).slope_ratio().is_infinite());
        assert!(Segment::new(0.0, 0.0).slope_ratio().is_infinite());
        assert!((Segment::new(200.0, -50.0).slope_ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::from_elevation(1.0).label(), "Ascent");
        assert_eq!(Direction::from_elevation(-1.0).label(), "Descent");
        assert_eq!(Direction::from_elevation(0.0).label(), "Flat");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(17.98651), 17.99);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(0.0), 0.0);
        assert!(round2(-0.004).is_sign_positive());
    }

    #[test]
    fn test_track_point_accessors() {
        let p = TrackPoint::new(40.5, -3.7, 650.0);
        assert_eq!(p.latitude(), 40.5);
        assert_eq!(p.longitude(), -3.7);
    }
}
