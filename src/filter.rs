//! Adaptive single-point position smoothing.
//!
//! A scalar Kalman-style filter that trades responsiveness against
//! stability in proportion to the reported measurement accuracy. One
//! variance value covers all axes; between fixes the variance grows with
//! elapsed time (process noise), so a long gap makes the next measurement
//! count for more.

use serde::{Deserialize, Serialize};

use crate::GpsPoint;

/// Tuning parameters for [`PositionFilter`].
///
/// These are configuration, not constants: the drift coefficient has no
/// physical derivation and is tuned per device class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Variance assigned when the filter is seeded from a known location
    /// without a measurement, in meters².
    pub initial_variance: f64,
    /// Process-noise growth per elapsed millisecond. Variance grows by
    /// `(elapsed_ms * drift_coefficient)²` between fixes.
    pub drift_coefficient: f64,
    /// Lower clamp for reported accuracy, in meters. Rejects spuriously
    /// perfect accuracy reports that would blow up the gain.
    pub min_accuracy: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial_variance: 3.0,
            drift_coefficient: 0.001,
            min_accuracy: 1.0,
        }
    }
}

impl FilterConfig {
    /// Heavier smoothing for dense canopy, where multipath noise dominates
    /// and the hiker moves slowly.
    pub fn dense_canopy() -> Self {
        Self {
            drift_coefficient: 0.0005,
            ..Self::default()
        }
    }

    /// More responsive tuning for open terrain with good sky view.
    pub fn open_terrain() -> Self {
        Self {
            drift_coefficient: 0.002,
            ..Self::default()
        }
    }
}

/// Internal state of an initialized filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Current smoothed position estimate.
    pub estimate: GpsPoint,
    /// Estimate variance in meters². Never negative.
    pub variance: f64,
    /// Timestamp of the last fix that advanced the filter clock.
    pub last_timestamp_millis: i64,
}

/// Adaptive smoothing filter over a stream of raw fixes.
///
/// Uninitialized until the first [`update`](Self::update),
/// [`initialize`](Self::initialize) or [`seed`](Self::seed) call. Owned by
/// exactly one tracking session; not safe for concurrent mutation.
#[derive(Debug, Clone)]
pub struct PositionFilter {
    config: FilterConfig,
    state: Option<FilterState>,
}

impl PositionFilter {
    /// Create an uninitialized filter.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Initialize from a first measurement: the estimate is the measurement
    /// itself and the variance is the (clamped) accuracy squared.
    pub fn initialize(&mut self, point: GpsPoint, accuracy_meters: f64, timestamp_millis: i64) {
        let accuracy = self.clamp_accuracy(accuracy_meters);
        self.state = Some(FilterState {
            estimate: point,
            variance: accuracy * accuracy,
            last_timestamp_millis: timestamp_millis,
        });
    }

    /// Prime the filter from a known location without a measurement, using
    /// the configured initial variance. Useful when the start of the trail
    /// is known before the first fix arrives.
    pub fn seed(&mut self, point: GpsPoint, timestamp_millis: i64) {
        self.state = Some(FilterState {
            estimate: point,
            variance: self.config.initial_variance,
            last_timestamp_millis: timestamp_millis,
        });
    }

    /// Process one measurement and return the refined estimate.
    ///
    /// The first call delegates to [`initialize`](Self::initialize).
    /// Out-of-order or duplicate timestamps skip the process-noise growth
    /// but still apply the correction step — fixes are never discarded.
    pub fn update(
        &mut self,
        point: GpsPoint,
        accuracy_meters: f64,
        timestamp_millis: i64,
    ) -> GpsPoint {
        let accuracy = self.clamp_accuracy(accuracy_meters);

        let Some(state) = self.state.as_mut() else {
            self.initialize(point, accuracy, timestamp_millis);
            return point;
        };

        let elapsed = timestamp_millis - state.last_timestamp_millis;
        if elapsed > 0 {
            let drift = elapsed as f64 * self.config.drift_coefficient;
            state.variance += drift * drift;
            state.last_timestamp_millis = timestamp_millis;
        }

        // Gain K = P / (P + R), guaranteed in [0, 1]
        let gain = state.variance / (state.variance + accuracy * accuracy);

        state.estimate.latitude += gain * (point.latitude - state.estimate.latitude);
        state.estimate.longitude += gain * (point.longitude - state.estimate.longitude);
        state.estimate.elevation += gain * (point.elevation - state.estimate.elevation);

        // P = (1 - K) * P
        state.variance *= 1.0 - gain;

        state.estimate
    }

    /// Discard all state, returning to uninitialized.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Current smoothed estimate, if initialized.
    pub fn estimate(&self) -> Option<GpsPoint> {
        self.state.map(|s| s.estimate)
    }

    /// Current estimate variance in meters², if initialized.
    pub fn variance(&self) -> Option<f64> {
        self.state.map(|s| s.variance)
    }

    /// Whether the filter has consumed at least one measurement or seed.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Snapshot of the full filter state, if initialized.
    pub fn state(&self) -> Option<FilterState> {
        self.state
    }

    fn clamp_accuracy(&self, accuracy_meters: f64) -> f64 {
        if accuracy_meters.is_finite() {
            accuracy_meters.max(self.config.min_accuracy)
        } else {
            self.config.min_accuracy
        }
    }
}
