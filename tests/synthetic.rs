//! Tests for the synthetic trail and fix-stream generator

use trailguard::synthetic::{FixStreamConfig, SyntheticTrail};
use trailguard::{classify, Classification, DeviationConfig, Severity};

#[test]
fn test_trail_generation_is_deterministic() {
    let config = SyntheticTrail::default();
    let a = config.generate("t1", "A");
    let b = config.generate("t1", "A");
    assert_eq!(a.geometry, b.geometry);

    let other_seed = SyntheticTrail {
        seed: 99,
        ..SyntheticTrail::default()
    };
    assert_ne!(a.geometry, other_seed.generate("t1", "A").geometry);
}

#[test]
fn test_trail_length_close_to_requested() {
    let trail = SyntheticTrail::default().generate("t1", "A");
    // Point spacing is planar; allow generous tolerance on total length
    let length = trail.length_meters();
    assert!(
        (4_000.0..6_000.0).contains(&length),
        "length {length} not near 5 km"
    );
    assert_eq!(trail.geometry.len(), 501);
}

#[test]
fn test_walk_fixes_stay_near_trail() {
    let trail = SyntheticTrail::default().generate("t1", "A");
    let fixes = FixStreamConfig::default().walk_fixes(&trail);
    assert_eq!(fixes.len(), trail.geometry.len());

    let config = DeviationConfig::default();
    let off_trail = fixes
        .iter()
        .filter(|f| classify(&f.point, &trail.geometry, &config).is_off_trail())
        .count();

    // 5 m sigma against a 50 m threshold: deviations should be very rare
    assert!(
        off_trail * 100 < fixes.len(),
        "{off_trail}/{} fixes off-trail",
        fixes.len()
    );
}

#[test]
fn test_fix_timestamps_advance_at_interval() {
    let trail = SyntheticTrail::default().generate("t1", "A");
    let stream = FixStreamConfig::default();
    let fixes = stream.walk_fixes(&trail);

    for pair in fixes.windows(2) {
        assert_eq!(
            pair[1].timestamp_millis - pair[0].timestamp_millis,
            stream.interval_millis
        );
    }
}

#[test]
fn test_departing_fixes_end_in_danger() {
    let trail = SyntheticTrail::default().generate("t1", "A");
    // Follow half the trail, then 40 steps of 10 m perpendicular
    let fixes = FixStreamConfig::default().departing_fixes(&trail, 250, 40, 10.0);
    assert_eq!(fixes.len(), 290);

    let config = DeviationConfig::default();
    let last = fixes.last().unwrap();
    let result = classify(&last.point, &trail.geometry, &config);

    match result {
        Classification::OffTrail { severity, .. } => assert_eq!(severity, Severity::Danger),
        Classification::OnTrail => panic!("departure scenario ended on-trail"),
    }
}
