//! In-memory reference collaborators.
//!
//! Small, dependency-free implementations of the session's collaborator
//! traits, used by the integration tests and the CLI simulator. Real
//! deployments substitute a database-backed store and a platform location
//! source behind the same traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use crate::deviation::Severity;
use crate::error::Result;
use crate::GpsPoint;

use super::{
    AlertSink, Breadcrumb, BreadcrumbStore, Fix, FixRequest, FixSender, FixSource,
    SubscriptionHandle, Trail, TrailSource,
};

/// Trail lookup backed by a map.
#[derive(Debug, Default)]
pub struct MemoryTrailSource {
    trails: HashMap<String, Trail>,
}

impl MemoryTrailSource {
    /// Build a source from a set of trails, keyed by trail id.
    pub fn from_trails(trails: impl IntoIterator<Item = Trail>) -> Self {
        Self {
            trails: trails.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

#[async_trait]
impl TrailSource for MemoryTrailSource {
    async fn resolve(&self, trail_id: &str) -> Option<Trail> {
        self.trails.get(trail_id).cloned()
    }
}

/// Fix source driven by explicit [`push`](ManualFixSource::push) calls.
///
/// Delivery uses `try_send`: when a subscriber's funnel is full or closed
/// the fix is dropped for that subscriber, mirroring a platform location
/// API that never blocks on its consumers.
#[derive(Debug, Default)]
pub struct ManualFixSource {
    subscribers: Mutex<HashMap<u64, FixSender>>,
    next_handle: AtomicU64,
}

impl ManualFixSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one fix to every live subscriber.
    pub fn push(&self, fix: Fix) {
        let subscribers = self.subscribers.lock().unwrap();
        for (handle, sink) in subscribers.iter() {
            if let Err(err) = sink.try_send(fix) {
                debug!("subscriber {handle} did not accept fix: {err}");
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

impl FixSource for ManualFixSource {
    fn subscribe(&self, request: &FixRequest, sink: FixSender) -> SubscriptionHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        debug!(
            "subscription {handle} requested ({} ms, {} m displacement)",
            request.interval_millis, request.min_displacement_meters
        );
        self.subscribers.lock().unwrap().insert(handle, sink);
        SubscriptionHandle(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.subscribers.lock().unwrap().remove(&handle.0);
    }
}

/// Breadcrumb store backed by a vector.
#[derive(Debug, Default)]
pub struct MemoryBreadcrumbStore {
    breadcrumbs: Mutex<Vec<Breadcrumb>>,
}

impl MemoryBreadcrumbStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent breadcrumb, if any was written.
    pub fn latest(&self) -> Option<Breadcrumb> {
        self.breadcrumbs.lock().unwrap().last().cloned()
    }

    /// All breadcrumbs in write order.
    pub fn all(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.breadcrumbs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.breadcrumbs.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl BreadcrumbStore for MemoryBreadcrumbStore {
    async fn append(&self, breadcrumb: Breadcrumb) -> Result<()> {
        self.breadcrumbs.lock().unwrap().push(breadcrumb);
        Ok(())
    }
}

/// Alert sink that records every notification.
#[derive(Debug, Default)]
pub struct CollectingAlertSink {
    alerts: Mutex<Vec<(Severity, GpsPoint)>>,
}

impl CollectingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<(Severity, GpsPoint)> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().unwrap().is_empty()
    }
}

impl AlertSink for CollectingAlertSink {
    fn notify(&self, severity: Severity, point: GpsPoint) {
        self.alerts.lock().unwrap().push((severity, point));
    }
}
