//! Geographic utility functions.
//!
//! Pure, stateless primitives shared by the classifier and the session:
//! haversine distance, point-to-segment projection and polyline length.

use crate::GpsPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Calculate the great-circle distance between two points in meters using
/// the haversine formula.
///
/// Symmetric and never negative; coincident points return 0 (subject to
/// floating-point rounding).
pub fn haversine_distance(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Calculate the shortest distance in meters from `p` to the segment
/// `start -> end`.
///
/// The projection parameter is computed on (lng, lat) treated as planar
/// Cartesian coordinates — a local-scale approximation that holds for trail
/// geometry but is not valid for continental distances. The parameter is
/// clamped to [0, 1] and the final distance from `p` to the projected point
/// is haversine. A degenerate segment (`start == end`) falls back to the
/// distance to `start`.
pub fn point_to_segment_distance(p: &GpsPoint, start: &GpsPoint, end: &GpsPoint) -> f64 {
    let (x, y) = (p.longitude, p.latitude);
    let (x1, y1) = (start.longitude, start.latitude);
    let (x2, y2) = (end.longitude, end.latitude);

    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((x - x1) * dx + (y - y1) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let projected = GpsPoint::new(y1 + t * dy, x1 + t * dx);
    haversine_distance(p, &projected)
}

/// Calculate the cumulative haversine length of a polyline in meters.
///
/// Returns 0 for polylines with fewer than 2 points.
pub fn path_distance(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}
