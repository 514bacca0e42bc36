//! Tests for the core types

use trailguard::session::Trail;
use trailguard::GpsPoint;

#[test]
fn test_gps_point_validity() {
    assert!(GpsPoint::new(46.5763, 8.0025).is_valid());
    assert!(GpsPoint::new(-90.0, 180.0).is_valid());
    assert!(!GpsPoint::new(f64::NAN, 8.0).is_valid());
    assert!(!GpsPoint::new(46.0, f64::INFINITY).is_valid());
    assert!(!GpsPoint::new(91.0, 0.0).is_valid());
    assert!(!GpsPoint::new(0.0, -181.0).is_valid());
    assert!(!GpsPoint::with_elevation(46.0, 8.0, f64::NAN).is_valid());
}

#[test]
fn test_gps_point_default_elevation() {
    assert_eq!(GpsPoint::new(46.0, 8.0).elevation, 0.0);
    assert_eq!(GpsPoint::with_elevation(46.0, 8.0, 1234.5).elevation, 1234.5);
}

#[test]
fn test_trail_length() {
    let trail = Trail {
        id: "t1".to_string(),
        name: "Test".to_string(),
        geometry: vec![
            GpsPoint::new(0.0, 0.0),
            GpsPoint::new(0.0, 0.001),
            GpsPoint::new(0.0, 0.002),
        ],
    };
    // Two ~111 m segments
    assert!((trail.length_meters() - 222.4).abs() < 2.0);

    let degenerate = Trail {
        id: "t2".to_string(),
        name: "Empty".to_string(),
        geometry: vec![],
    };
    assert_eq!(degenerate.length_meters(), 0.0);
}

#[test]
fn test_trail_deserializes_without_elevation() {
    // Trails imported from 2D sources carry no elevation field
    let json = r#"{
        "id": "t1",
        "name": "Ridge",
        "geometry": [
            {"latitude": 46.5763, "longitude": 8.0025},
            {"latitude": 46.5770, "longitude": 8.0040, "elevation": 1250.0}
        ]
    }"#;
    let trail: Trail = serde_json::from_str(json).unwrap();
    assert_eq!(trail.geometry[0].elevation, 0.0);
    assert_eq!(trail.geometry[1].elevation, 1250.0);
}
