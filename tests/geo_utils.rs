//! Tests for geo_utils module

use trailguard::geo_utils::*;
use trailguard::GpsPoint;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_distance_same_point() {
    let p = GpsPoint::new(46.5763, 8.0025);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_one_degree_longitude_at_equator() {
    // One degree of longitude at the equator is ~111,195 m with R = 6371 km
    let a = GpsPoint::new(0.0, 0.0);
    let b = GpsPoint::new(0.0, 1.0);
    let dist = haversine_distance(&a, &b);
    assert!(approx_eq(dist, 111_195.0, 1_112.0)); // within 1%
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GpsPoint::new(51.5074, -0.1278);
    let paris = GpsPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5_000.0));
}

#[test]
fn test_haversine_distance_symmetric() {
    let a = GpsPoint::new(46.5763, 8.0025);
    let b = GpsPoint::new(46.6021, 8.0411);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_haversine_distance_never_negative() {
    let a = GpsPoint::new(-33.8688, 151.2093);
    let b = GpsPoint::new(-33.8689, 151.2094);
    assert!(haversine_distance(&a, &b) >= 0.0);
}

#[test]
fn test_point_on_segment_has_zero_distance() {
    let start = GpsPoint::new(0.0, 0.0);
    let end = GpsPoint::new(0.0, 1.0);
    let mid = GpsPoint::new(0.0, 0.5);
    let dist = point_to_segment_distance(&mid, &start, &end);
    assert!(approx_eq(dist, 0.0, 1e-6));
}

#[test]
fn test_segment_endpoints_have_zero_distance() {
    let start = GpsPoint::new(46.5, 8.0);
    let end = GpsPoint::new(46.6, 8.1);
    assert!(approx_eq(point_to_segment_distance(&start, &start, &end), 0.0, 1e-6));
    assert!(approx_eq(point_to_segment_distance(&end, &start, &end), 0.0, 1e-6));
}

#[test]
fn test_perpendicular_offset_distance() {
    // 0.001 degrees of latitude is ~111.2 m regardless of longitude
    let start = GpsPoint::new(0.0, 0.0);
    let end = GpsPoint::new(0.0, 1.0);
    let p = GpsPoint::new(0.001, 0.5);
    let dist = point_to_segment_distance(&p, &start, &end);
    assert!(approx_eq(dist, 111.2, 2.0));
}

#[test]
fn test_projection_clamps_beyond_end() {
    // Point past the end of the segment measures to the end point
    let start = GpsPoint::new(0.0, 0.0);
    let end = GpsPoint::new(0.0, 1.0);
    let p = GpsPoint::new(0.0, 1.5);
    let expected = haversine_distance(&p, &end);
    let dist = point_to_segment_distance(&p, &start, &end);
    assert!(approx_eq(dist, expected, 1e-6));
}

#[test]
fn test_projection_clamps_before_start() {
    let start = GpsPoint::new(0.0, 0.0);
    let end = GpsPoint::new(0.0, 1.0);
    let p = GpsPoint::new(0.0, -0.5);
    let expected = haversine_distance(&p, &start);
    let dist = point_to_segment_distance(&p, &start, &end);
    assert!(approx_eq(dist, expected, 1e-6));
}

#[test]
fn test_degenerate_segment_measures_to_endpoint() {
    let s = GpsPoint::new(46.5, 8.0);
    let p = GpsPoint::new(46.501, 8.0);
    let expected = haversine_distance(&p, &s);
    let dist = point_to_segment_distance(&p, &s, &s);
    assert!(approx_eq(dist, expected, 1e-9));
}

#[test]
fn test_path_distance_short_polylines() {
    assert_eq!(path_distance(&[]), 0.0);
    assert_eq!(path_distance(&[GpsPoint::new(46.5, 8.0)]), 0.0);
}

#[test]
fn test_path_distance_sums_segments() {
    let points = vec![
        GpsPoint::new(0.0, 0.0),
        GpsPoint::new(0.0, 0.5),
        GpsPoint::new(0.0, 1.0),
    ];
    let total = path_distance(&points);
    let direct = haversine_distance(&points[0], &points[2]);
    assert!(approx_eq(total, direct, 1.0));
}
