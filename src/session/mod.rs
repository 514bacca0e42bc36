//! # Tracking Session
//!
//! The orchestrator that wires a live fix stream to the smoothing filter,
//! the deviation classifier, the breadcrumb log and the alert sink.
//!
//! ## Architecture
//!
//! Collaborators are injected as trait objects at construction:
//! - [`TrailSource`] - resolves a trail id to its polyline
//! - [`FixSource`] - delivers raw GPS fixes into a bounded channel
//! - [`BreadcrumbStore`] - persists one record per processed fix
//! - [`AlertSink`] - receives danger notifications
//!
//! Fix processing is strictly sequential: the fix source pushes into a
//! bounded mpsc channel and a single worker task consumes it, so the filter
//! state is never touched concurrently. Breadcrumb writes are spawned onto
//! independent tasks and carry no back-pressure into the fix pipeline.

pub mod memory;

pub use memory::{CollectingAlertSink, ManualFixSource, MemoryBreadcrumbStore, MemoryTrailSource};

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::deviation::{classify, Classification, DeviationConfig, Severity};
use crate::error::{OptionExt, Result, TrackingError};
use crate::filter::{FilterConfig, PositionFilter};
use crate::geo_utils::path_distance;
use crate::GpsPoint;

// ============================================================================
// Data Model
// ============================================================================

/// A named trail polyline. Read-only from the session's perspective;
/// supplied by the trail source at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    pub id: String,
    pub name: String,
    /// Ordered coordinates; insertion order is path order.
    pub geometry: Vec<GpsPoint>,
}

impl Trail {
    /// Cumulative length of the trail polyline in meters.
    pub fn length_meters(&self) -> f64 {
        path_distance(&self.geometry)
    }
}

/// One raw position measurement from the fix source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub point: GpsPoint,
    /// Reported horizontal accuracy in meters.
    pub accuracy_meters: f64,
    pub timestamp_millis: i64,
}

/// A persisted record of one processed, filtered position sample.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub session_id: u64,
    pub timestamp_millis: i64,
    /// The refined (smoothed) coordinate, not the raw measurement.
    pub point: GpsPoint,
    pub accuracy_meters: f64,
    pub off_trail: bool,
}

/// Requested fix cadence, passed through to the fix source.
///
/// Cadence is a property of the external source, not of the pipeline; the
/// session forwards it unchanged on subscribe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixRequest {
    /// Desired update interval in milliseconds. Default: 1000 (1 Hz).
    pub interval_millis: u64,
    /// Minimum displacement before a new fix is delivered. Default: 2 m.
    pub min_displacement_meters: f64,
}

impl Default for FixRequest {
    fn default() -> Self {
        Self {
            interval_millis: 1000,
            min_displacement_meters: 2.0,
        }
    }
}

/// Lifecycle state of a [`TrackingSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active { trail_id: String },
    Stopped,
}

/// Configuration for a tracking session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub filter: FilterConfig,
    pub deviation: DeviationConfig,
    pub fix_request: FixRequest,
    /// Capacity of the fix funnel channel.
    pub channel_capacity: usize,
}

impl SessionConfig {
    /// Default channel capacity when the configured value is 0.
    const DEFAULT_CHANNEL_CAPACITY: usize = 32;

    fn channel_capacity(&self) -> usize {
        if self.channel_capacity == 0 {
            Self::DEFAULT_CHANNEL_CAPACITY
        } else {
            self.channel_capacity
        }
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Sender half of the fix funnel, handed to the fix source on subscribe.
pub type FixSender = mpsc::Sender<Fix>;

/// Opaque handle identifying one fix subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub u64);

/// Resolves trail identifiers to trail polylines.
#[async_trait]
pub trait TrailSource: Send + Sync {
    /// Look up a trail by id. `None` means not found.
    async fn resolve(&self, trail_id: &str) -> Option<Trail>;
}

/// Delivers raw fixes into the session's funnel channel.
///
/// Timestamps are assumed monotonic per the platform contract, but the
/// pipeline tolerates violations (the filter skips noise growth for
/// non-increasing timestamps).
pub trait FixSource: Send + Sync {
    /// Begin delivering fixes at the requested cadence into `sink`.
    fn subscribe(&self, request: &FixRequest, sink: FixSender) -> SubscriptionHandle;
    /// Stop delivering fixes for a previous subscription.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// Persists breadcrumbs. Writes are fire-and-forget from the session's
/// perspective: failures are logged and the sample is lost, nothing more.
#[async_trait]
pub trait BreadcrumbStore: Send + Sync {
    async fn append(&self, breadcrumb: Breadcrumb) -> Result<()>;
}

/// Receives danger notifications. No acknowledgment required.
pub trait AlertSink: Send + Sync {
    fn notify(&self, severity: Severity, point: GpsPoint);
}

// ============================================================================
// Session
// ============================================================================

struct Inner {
    state: SessionState,
    subscription: Option<SubscriptionHandle>,
    cancel: Option<CancellationToken>,
    worker: Option<JoinHandle<()>>,
    session_id: Option<u64>,
    next_session_id: u64,
}

/// Live tracking orchestrator and state machine.
///
/// `Idle -> Active -> Stopped`, with restart allowed from both `Idle` and
/// `Stopped`. All methods are safe to call from any task; `stop` is safe
/// concurrently with in-flight fix processing.
pub struct TrackingSession {
    trails: Arc<dyn TrailSource>,
    fixes: Arc<dyn FixSource>,
    store: Arc<dyn BreadcrumbStore>,
    alerts: Arc<dyn AlertSink>,
    config: SessionConfig,
    latest_tx: watch::Sender<Option<Breadcrumb>>,
    // Held so publishes always succeed and late subscribers get replay.
    latest_rx: watch::Receiver<Option<Breadcrumb>>,
    inner: Mutex<Inner>,
}

impl TrackingSession {
    /// Create a session with injected collaborators. The session starts in
    /// `Idle` and does nothing until [`start`](Self::start).
    pub fn new(
        trails: Arc<dyn TrailSource>,
        fixes: Arc<dyn FixSource>,
        store: Arc<dyn BreadcrumbStore>,
        alerts: Arc<dyn AlertSink>,
        config: SessionConfig,
    ) -> Self {
        let (latest_tx, latest_rx) = watch::channel(None);
        Self {
            trails,
            fixes,
            store,
            alerts,
            config,
            latest_tx,
            latest_rx,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                subscription: None,
                cancel: None,
                worker: None,
                session_id: None,
                next_session_id: 1,
            }),
        }
    }

    /// Start tracking the given trail.
    ///
    /// Resolves the trail, resets the filter, subscribes to the fix source
    /// and transitions to `Active`. Fails with
    /// [`TrackingError::TrailNotFound`] (state unchanged) when the trail id
    /// is unknown and [`TrackingError::SessionActive`] when already active.
    pub async fn start(&self, trail_id: &str) -> Result<()> {
        self.ensure_not_active()?;

        let trail = self
            .trails
            .resolve(trail_id)
            .await
            .ok_or_trail_not_found(trail_id)?;

        let mut inner = self.inner.lock().unwrap();
        // A concurrent start may have won while we were resolving.
        if let SessionState::Active { trail_id } = &inner.state {
            return Err(TrackingError::SessionActive {
                trail_id: trail_id.clone(),
            });
        }

        let session_id = inner.next_session_id;
        inner.next_session_id += 1;

        info!(
            "session {} tracking '{}' ({:.0} m, {} points)",
            session_id,
            trail.name,
            trail.length_meters(),
            trail.geometry.len()
        );

        // New session: clear the replayed breadcrumb from any previous run.
        let _ = self.latest_tx.send(None);

        let (fix_tx, fix_rx) = mpsc::channel(self.config.channel_capacity());
        let cancel = CancellationToken::new();

        let worker = Worker {
            session_id,
            trail,
            filter: PositionFilter::new(self.config.filter),
            deviation: self.config.deviation,
            store: Arc::clone(&self.store),
            alerts: Arc::clone(&self.alerts),
            latest_tx: self.latest_tx.clone(),
        };
        inner.worker = Some(tokio::spawn(worker.run(fix_rx, cancel.clone())));

        inner.subscription = Some(self.fixes.subscribe(&self.config.fix_request, fix_tx));
        inner.cancel = Some(cancel);
        inner.session_id = Some(session_id);
        inner.state = SessionState::Active {
            trail_id: trail_id.to_string(),
        };
        Ok(())
    }

    /// Stop tracking. Idempotent: a no-op unless currently `Active`.
    ///
    /// Unsubscribes from the fix source and cancels the worker. Once this
    /// returns, no further classification or persistence dispatch is newly
    /// initiated; already-spawned breadcrumb writes complete on their own
    /// schedule.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        if !matches!(inner.state, SessionState::Active { .. }) {
            return;
        }

        if let Some(handle) = inner.subscription.take() {
            self.fixes.unsubscribe(handle);
        }
        if let Some(cancel) = inner.cancel.take() {
            cancel.cancel();
        }
        // Worker exits via cancellation; no blocking wait on in-flight writes.
        inner.worker = None;
        inner.state = SessionState::Stopped;
        info!("session {:?} stopped", inner.session_id);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Identifier of the current (or most recent) session run.
    pub fn session_id(&self) -> Option<u64> {
        self.inner.lock().unwrap().session_id
    }

    /// Observe the most recent breadcrumb with single-latest-value replay.
    ///
    /// A fresh receiver immediately yields the last published breadcrumb
    /// (or `None` before the first processed fix of the current run).
    pub fn latest_breadcrumb(&self) -> watch::Receiver<Option<Breadcrumb>> {
        self.latest_rx.clone()
    }

    fn ensure_not_active(&self) -> Result<()> {
        let inner = self.inner.lock().unwrap();
        if let SessionState::Active { trail_id } = &inner.state {
            return Err(TrackingError::SessionActive {
                trail_id: trail_id.clone(),
            });
        }
        Ok(())
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Single sequential consumer of the fix funnel. Owns the filter and the
/// active trail for one session run.
struct Worker {
    session_id: u64,
    trail: Trail,
    filter: PositionFilter,
    deviation: DeviationConfig,
    store: Arc<dyn BreadcrumbStore>,
    alerts: Arc<dyn AlertSink>,
    latest_tx: watch::Sender<Option<Breadcrumb>>,
}

impl Worker {
    async fn run(mut self, mut fix_rx: mpsc::Receiver<Fix>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("session {} worker cancelled", self.session_id);
                    break;
                }

                fix = fix_rx.recv() => match fix {
                    Some(fix) => self.process_fix(fix),
                    None => {
                        debug!("session {} fix channel closed", self.session_id);
                        break;
                    }
                }
            }
        }
    }

    /// Run one fix through the pipeline. Nothing here is allowed to be
    /// fatal to the session: malformed input is clamped or dropped with a
    /// diagnostic and processing continues with the next fix.
    fn process_fix(&mut self, fix: Fix) {
        if !fix.point.is_valid() {
            warn!(
                "session {} dropping fix with invalid coordinates ({}, {})",
                self.session_id, fix.point.latitude, fix.point.longitude
            );
            return;
        }

        let accuracy = if fix.accuracy_meters.is_finite() && fix.accuracy_meters > 0.0 {
            fix.accuracy_meters
        } else {
            warn!(
                "session {} clamping unusable accuracy report {}",
                self.session_id, fix.accuracy_meters
            );
            // The filter clamps to its configured minimum.
            0.0
        };

        let refined = self.filter.update(fix.point, accuracy, fix.timestamp_millis);
        let classification = classify(&refined, &self.trail.geometry, &self.deviation);

        let breadcrumb = Breadcrumb {
            session_id: self.session_id,
            timestamp_millis: fix.timestamp_millis,
            point: refined,
            accuracy_meters: accuracy,
            off_trail: classification.is_off_trail(),
        };

        let _ = self.latest_tx.send(Some(breadcrumb.clone()));

        // Persistence runs on its own task: a slow or failing write never
        // delays the next fix. Failures are logged, not retried.
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(err) = store.append(breadcrumb).await {
                warn!("breadcrumb write failed (sample dropped): {err}");
            }
        });

        if let Classification::OffTrail {
            distance_meters,
            severity: Severity::Danger,
        } = classification
        {
            warn!(
                "session {} danger: {:.0} m off '{}'",
                self.session_id, distance_meters, self.trail.name
            );
            self.alerts.notify(Severity::Danger, refined);
        }
    }
}
