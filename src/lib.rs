//! # Trailguard
//!
//! Offline trail-following tracker for noisy, intermittent GPS fixes.
//!
//! This library provides:
//! - Adaptive single-point position smoothing (Kalman-style gain)
//! - Geodesic distance and point-to-segment projection primitives
//! - On-trail / warning / danger deviation classification against a polyline
//! - A tokio-based tracking session that wires a live fix stream to a
//!   breadcrumb log and an alert sink
//!
//! Everything runs locally; there is no network dependency anywhere in the
//! processing path.
//!
//! ## Quick Start
//!
//! ```rust
//! use trailguard::{classify, DeviationConfig, GpsPoint};
//!
//! let trail = vec![
//!     GpsPoint::new(46.5763, 8.0025),
//!     GpsPoint::new(46.5770, 8.0040),
//!     GpsPoint::new(46.5781, 8.0052),
//! ];
//!
//! let hiker = GpsPoint::new(46.5771, 8.0041);
//! let result = classify(&hiker, &trail, &DeviationConfig::default());
//! assert!(!result.is_off_trail());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrackingError};

// Geographic primitives (haversine, segment projection, path length)
pub mod geo_utils;
pub use geo_utils::{haversine_distance, path_distance, point_to_segment_distance};

// Adaptive position smoothing filter
pub mod filter;
pub use filter::{FilterConfig, FilterState, PositionFilter};

// Trail deviation classification
pub mod deviation;
pub use deviation::{classify, Classification, DeviationConfig, Severity};

// Tracking session orchestrator and collaborator traits
pub mod session;
pub use session::{
    AlertSink, Breadcrumb, BreadcrumbStore, Fix, FixRequest, FixSender, FixSource, SessionConfig,
    SessionState, SubscriptionHandle, TrackingSession, Trail, TrailSource,
};

// Synthetic trail/fix generation for tests and the CLI
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude, longitude and elevation.
///
/// # Example
/// ```
/// use trailguard::GpsPoint;
/// let point = GpsPoint::new(46.5763, 8.0025); // Eiger trail
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters (0 when the source does not report it)
    #[serde(default)]
    pub elevation: f64,
}

impl GpsPoint {
    /// Create a new GPS point at elevation 0.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: 0.0,
        }
    }

    /// Create a new GPS point with elevation.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.elevation.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}
