//! Trail deviation classification.
//!
//! Classifies a refined position against a trail polyline into on-trail,
//! warning or danger bands based on the minimum distance to any segment.
//! Cost is O(segments) per call, which is fine at ~1 Hz against trails of a
//! few thousand points; an R-tree over segments would be the first
//! optimization for much larger trails.

use serde::{Deserialize, Serialize};

use crate::geo_utils::point_to_segment_distance;
use crate::GpsPoint;

/// How far off the trail a position is, beyond the warning band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Danger,
}

/// Result of classifying a position against a trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Classification {
    /// Within the warning threshold of the nearest segment.
    OnTrail,
    /// Beyond the warning threshold; distance is the minimum distance to
    /// the trail in meters (infinite for degenerate trails).
    OffTrail {
        distance_meters: f64,
        severity: Severity,
    },
}

impl Classification {
    /// Whether the position was classified off-trail.
    pub fn is_off_trail(&self) -> bool {
        matches!(self, Classification::OffTrail { .. })
    }

    /// Severity of the deviation, if off-trail.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Classification::OnTrail => None,
            Classification::OffTrail { severity, .. } => Some(*severity),
        }
    }
}

/// Distance thresholds for the severity bands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviationConfig {
    /// Distances up to and including this are on-trail. Default: 50 m.
    pub warning_threshold_meters: f64,
    /// Distances up to and including this are Warning; beyond is Danger.
    /// Default: 150 m.
    pub danger_threshold_meters: f64,
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            warning_threshold_meters: 50.0,
            danger_threshold_meters: 150.0,
        }
    }
}

/// Classify a position against a trail polyline.
///
/// A deterministic pure function of its inputs. A degenerate trail (fewer
/// than 2 points) cannot be matched against and fails toward the safer
/// outcome: `OffTrail` at infinite distance with `Danger` severity, never
/// silently on-trail.
pub fn classify(point: &GpsPoint, trail_geometry: &[GpsPoint], config: &DeviationConfig) -> Classification {
    if trail_geometry.len() < 2 {
        return Classification::OffTrail {
            distance_meters: f64::INFINITY,
            severity: Severity::Danger,
        };
    }

    let min_distance = trail_geometry
        .windows(2)
        .map(|segment| point_to_segment_distance(point, &segment[0], &segment[1]))
        .fold(f64::INFINITY, f64::min);

    if min_distance <= config.warning_threshold_meters {
        Classification::OnTrail
    } else {
        let severity = if min_distance <= config.danger_threshold_meters {
            Severity::Warning
        } else {
            Severity::Danger
        };
        Classification::OffTrail {
            distance_meters: min_distance,
            severity,
        }
    }
}
