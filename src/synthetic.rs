//! Synthetic trail and fix-stream generator.
//!
//! Deterministic (seeded) generation of trail polylines and noisy GPS fix
//! streams walking along or away from them, providing ground truth for the
//! filter, classifier and session tests and for the CLI simulator.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::session::{Fix, Trail};
use crate::GpsPoint;

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Convert meters to degrees of latitude.
fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert meters to degrees of longitude at a given latitude.
fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lng.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lng
}

/// Displace a point by the given distance along a heading (radians,
/// 0 = east, PI/2 = north).
fn advance(point: &GpsPoint, distance_meters: f64, heading: f64) -> GpsPoint {
    GpsPoint::with_elevation(
        point.latitude + meters_to_deg_lat(distance_meters * heading.sin()),
        point.longitude + meters_to_deg_lng(distance_meters * heading.cos(), point.latitude),
        point.elevation,
    )
}

/// One sample of zero-mean Gaussian noise (Box-Muller transform).
fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen();
    sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

// ============================================================================
// Trail Generation
// ============================================================================

/// Configuration for a generated trail.
#[derive(Debug, Clone)]
pub struct SyntheticTrail {
    /// Starting point of the trail.
    pub origin: GpsPoint,
    /// Total trail length in meters.
    pub length_meters: f64,
    /// Initial heading in radians (0 = east).
    pub heading: f64,
    /// Spacing between consecutive polyline points in meters.
    pub point_spacing_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticTrail {
    fn default() -> Self {
        Self {
            origin: GpsPoint::new(46.5763, 8.0025),
            length_meters: 5_000.0,
            heading: PI / 4.0,
            point_spacing_meters: 10.0,
            seed: 42,
        }
    }
}

impl SyntheticTrail {
    /// Generate a gently winding trail polyline.
    pub fn generate(&self, id: &str, name: &str) -> Trail {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let num_points = (self.length_meters / self.point_spacing_meters).ceil() as usize;

        let mut heading = self.heading;
        let mut current = self.origin;
        let mut geometry = Vec::with_capacity(num_points + 1);
        geometry.push(current);

        for i in 0..num_points {
            // Gentle sinusoidal base turn plus small random drift
            heading += (i as f64 * 0.01).sin() * 0.02 + rng.gen_range(-0.02..0.02);
            current = advance(&current, self.point_spacing_meters, heading);
            current.elevation = 1200.0 + 80.0 * (i as f64 * 0.004).sin();
            geometry.push(current);
        }

        Trail {
            id: id.to_string(),
            name: name.to_string(),
            geometry,
        }
    }
}

// ============================================================================
// Fix Stream Generation
// ============================================================================

/// Configuration for a generated fix stream.
#[derive(Debug, Clone)]
pub struct FixStreamConfig {
    /// GPS noise standard deviation in meters.
    pub noise_sigma_meters: f64,
    /// Reported horizontal accuracy in meters.
    pub accuracy_meters: f64,
    /// Milliseconds between fixes.
    pub interval_millis: i64,
    /// Timestamp of the first fix.
    pub start_timestamp_millis: i64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for FixStreamConfig {
    fn default() -> Self {
        Self {
            noise_sigma_meters: 5.0,
            accuracy_meters: 8.0,
            interval_millis: 1000,
            start_timestamp_millis: 1_700_000_000_000,
            seed: 7,
        }
    }
}

impl FixStreamConfig {
    /// Noisy fixes walking the trail point by point.
    pub fn walk_fixes(&self, trail: &Trail) -> Vec<Fix> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        trail
            .geometry
            .iter()
            .enumerate()
            .map(|(i, p)| self.noisy_fix(p, i, &mut rng))
            .collect()
    }

    /// Fixes that follow the trail for `on_trail_count` points and then
    /// head perpendicular to the local trail heading, one step of
    /// `step_meters` per fix. Ground truth for deviation scenarios.
    pub fn departing_fixes(
        &self,
        trail: &Trail,
        on_trail_count: usize,
        departure_count: usize,
        step_meters: f64,
    ) -> Vec<Fix> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut fixes: Vec<Fix> = trail
            .geometry
            .iter()
            .take(on_trail_count)
            .enumerate()
            .map(|(i, p)| self.noisy_fix(p, i, &mut rng))
            .collect();

        let pivot_index = on_trail_count.min(trail.geometry.len()).saturating_sub(1);
        let pivot = trail.geometry[pivot_index];
        let heading = trail_heading_at(trail, pivot_index) + PI / 2.0;

        let mut current = pivot;
        for i in 0..departure_count {
            current = advance(&current, step_meters, heading);
            fixes.push(self.noisy_fix(&current, on_trail_count + i, &mut rng));
        }

        fixes
    }

    fn noisy_fix(&self, point: &GpsPoint, index: usize, rng: &mut StdRng) -> Fix {
        let noisy = GpsPoint::with_elevation(
            point.latitude + meters_to_deg_lat(gaussian(rng, self.noise_sigma_meters)),
            point.longitude
                + meters_to_deg_lng(gaussian(rng, self.noise_sigma_meters), point.latitude),
            point.elevation,
        );
        Fix {
            point: noisy,
            accuracy_meters: self.accuracy_meters,
            timestamp_millis: self.start_timestamp_millis + index as i64 * self.interval_millis,
        }
    }
}

/// Heading of the trail at the given point index, in radians.
fn trail_heading_at(trail: &Trail, index: usize) -> f64 {
    let (a, b) = if index + 1 < trail.geometry.len() {
        (trail.geometry[index], trail.geometry[index + 1])
    } else if index > 0 {
        (trail.geometry[index - 1], trail.geometry[index])
    } else {
        return 0.0;
    };

    let dlat = (b.latitude - a.latitude) * METERS_PER_DEG_LAT;
    let dlng = (b.longitude - a.longitude)
        * METERS_PER_DEG_LAT
        * ((a.latitude + b.latitude) / 2.0).to_radians().cos();
    dlat.atan2(dlng)
}
